use std::sync::LazyLock;

use regex::Regex;

pub const FEEDBACK_SUBMITTED: &str = "Application submitted successfully!";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

// Exactly 11 digits starting with 09
static CONTACT_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09\d{9}$").expect("valid contact number regex"));

/// The four input fields of the apply form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    ContactNumber,
    WhyHire,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Full Name",
            FormField::Email => "Email Address",
            FormField::ContactNumber => "Phone Number",
            FormField::WhyHire => "Why should we hire you?",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::ContactNumber,
            FormField::ContactNumber => FormField::WhyHire,
            FormField::WhyHire => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::WhyHire,
            FormField::Email => FormField::Name,
            FormField::ContactNumber => FormField::Email,
            FormField::WhyHire => FormField::ContactNumber,
        }
    }

    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Email,
        FormField::ContactNumber,
        FormField::WhyHire,
    ];
}

/// One optional message per form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub why_hire: Option<String>,
}

impl FormErrors {
    pub fn is_clear(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.contact_number.is_none()
            && self.why_hire.is_none()
    }

    pub fn for_field(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => self.name.as_deref(),
            FormField::Email => self.email.as_deref(),
            FormField::ContactNumber => self.contact_number.as_deref(),
            FormField::WhyHire => self.why_hire.as_deref(),
        }
    }
}

/// Transient application form, created blank when the apply modal opens
/// and discarded with it.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub why_hire: String,
    pub errors: FormErrors,
    pub feedback_message: String,
}

impl ApplicationForm {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::ContactNumber => &self.contact_number,
            FormField::WhyHire => &self.why_hire,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::ContactNumber => &mut self.contact_number,
            FormField::WhyHire => &mut self.why_hire,
        }
    }

    /// Checks every field and records all applicable errors together; no
    /// field short-circuits another. Returns true when the form is valid.
    pub fn validate(&mut self) -> bool {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.name = Some("Name is required.".to_string());
        }

        if self.email.trim().is_empty() {
            errors.email = Some("Email is required.".to_string());
        } else if !EMAIL_PATTERN.is_match(&self.email) {
            errors.email = Some("Please enter a valid email address.".to_string());
        }

        if self.contact_number.trim().is_empty() {
            errors.contact_number = Some("Contact number is required.".to_string());
        } else if !CONTACT_NUMBER_PATTERN.is_match(&self.contact_number) {
            errors.contact_number = Some(
                "Please enter a valid contact number (11 digits starting with 09).".to_string(),
            );
        }

        if self.why_hire.trim().is_empty() {
            errors.why_hire = Some("This field is required.".to_string());
        }

        let valid = errors.is_clear();
        self.errors = errors;
        valid
    }

    /// On a valid form: sets the success feedback and blanks the inputs;
    /// the caller schedules the delayed modal close. On an invalid form
    /// the inputs stay intact and the errors say why.
    pub fn submit(&mut self) -> bool {
        if !self.validate() {
            return false;
        }
        self.feedback_message = FEEDBACK_SUBMITTED.to_string();
        self.name.clear();
        self.email.clear();
        self.contact_number.clear();
        self.why_hire.clear();
        self.errors = FormErrors::default();
        true
    }
}
