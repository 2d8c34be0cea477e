use std::time::{Duration, Instant};

use crate::api::FetchError;
use crate::form::{ApplicationForm, FormField};
use crate::models::Job;

/// How long the apply modal stays open showing the submission feedback
/// before closing on its own.
pub const SUBMIT_CLOSE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Jobs,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

/// The apply modal: the job being applied to, its per-session form, the
/// focused input, and the deferred-close deadline armed by a successful
/// submit.
#[derive(Debug)]
pub struct ApplyModal {
    pub job: Job,
    pub form: ApplicationForm,
    pub focus: FormField,
    pub close_at: Option<Instant>,
}

/// Case-insensitive substring filter on title or company, preserving
/// catalog order. A blank term returns the whole catalog.
pub fn filter_catalog(jobs: &[Job], term: &str) -> Vec<Job> {
    if term.trim().is_empty() {
        return jobs.to_vec();
    }
    let needle = term.to_lowercase();
    jobs.iter()
        .filter(|job| {
            job.title.to_lowercase().contains(&needle)
                || job.company_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// All session state for the browse UI. One instance owns the catalog, the
/// saved set, and both screens' transient state; the saved set is never
/// copied between screens.
pub struct App {
    pub screen: Screen,
    pub input_mode: InputMode,

    pub jobs: Vec<Job>,
    pub filtered_jobs: Vec<Job>,
    pub search_term: String,
    pub selected: usize,

    pub saved_jobs: Vec<Job>,
    pub saved_selected: usize,

    pub loading: bool,
    pub notice: Option<String>,

    pub apply_modal: Option<ApplyModal>,
    pub pending_removal: Option<Job>,

    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            screen: Screen::Jobs,
            input_mode: InputMode::Normal,
            jobs: Vec::new(),
            filtered_jobs: Vec::new(),
            search_term: String::new(),
            selected: 0,
            saved_jobs: Vec::new(),
            saved_selected: 0,
            loading: true,
            notice: None,
            apply_modal: None,
            pending_removal: None,
            should_quit: false,
        }
    }

    /// Lands the one-shot catalog fetch. Success replaces the catalog and
    /// the filtered view wholesale; failure leaves the catalog empty and
    /// surfaces a notice. There is no retry.
    pub fn finish_fetch(&mut self, result: Result<Vec<Job>, FetchError>) {
        self.loading = false;
        match result {
            Ok(jobs) => {
                self.filtered_jobs = jobs.clone();
                self.jobs = jobs;
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog fetch failed");
                self.notice = Some(err.notice().to_string());
            }
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.filtered_jobs = filter_catalog(&self.jobs, &self.search_term);
        self.clamp_selection();
    }

    pub fn search_push(&mut self, c: char) {
        let mut term = std::mem::take(&mut self.search_term);
        term.push(c);
        self.set_search_term(term);
    }

    pub fn search_pop(&mut self) {
        let mut term = std::mem::take(&mut self.search_term);
        term.pop();
        self.set_search_term(term);
    }

    fn clamp_selection(&mut self) {
        if self.filtered_jobs.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(self.filtered_jobs.len() - 1);
        }
    }

    /// Adds the job to the saved set, or removes it if a job with the same
    /// id is already there. Saved order is append order.
    pub fn toggle_save(&mut self, job: &Job) {
        if let Some(pos) = self.saved_jobs.iter().position(|saved| saved.id == job.id) {
            self.saved_jobs.remove(pos);
        } else {
            self.saved_jobs.push(job.clone());
        }
    }

    pub fn is_saved(&self, job: &Job) -> bool {
        self.saved_jobs.iter().any(|saved| saved.id == job.id)
    }

    // --- Removal confirmation gate ---

    /// Arms the removal gate. Nothing is removed until `confirm_removal`.
    pub fn request_removal(&mut self, job: Job) {
        self.pending_removal = Some(job);
    }

    /// Removes every saved job matching the pending candidate's id and
    /// disarms the gate.
    pub fn confirm_removal(&mut self) {
        if let Some(job) = self.pending_removal.take() {
            self.saved_jobs.retain(|saved| saved.id != job.id);
            if self.saved_jobs.is_empty() {
                self.saved_selected = 0;
            } else {
                self.saved_selected = self.saved_selected.min(self.saved_jobs.len() - 1);
            }
        }
    }

    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    // --- Apply modal lifecycle ---

    pub fn open_apply(&mut self, job: Job) {
        self.apply_modal = Some(ApplyModal {
            job,
            form: ApplicationForm::default(),
            focus: FormField::Name,
            close_at: None,
        });
    }

    /// Explicit close: the form, its errors, and any feedback go with it,
    /// along with any pending close deadline.
    pub fn close_apply(&mut self) {
        self.apply_modal = None;
    }

    /// A valid submit shows the feedback and arms the delayed close; an
    /// invalid one keeps the modal open with the inputs intact.
    pub fn submit_apply(&mut self, now: Instant) {
        if let Some(modal) = self.apply_modal.as_mut() {
            if modal.form.submit() {
                modal.close_at = Some(now + SUBMIT_CLOSE_DELAY);
            }
        }
    }

    /// Fires the post-submit close once its deadline passes. A deadline
    /// dropped by a manual close never fires. The saved screen's apply
    /// flow also returns to the jobs screen when the close fires.
    pub fn tick(&mut self, now: Instant) {
        let due = self
            .apply_modal
            .as_ref()
            .and_then(|modal| modal.close_at)
            .is_some_and(|at| now >= at);
        if due {
            self.apply_modal = None;
            if self.screen == Screen::Saved {
                self.screen = Screen::Jobs;
            }
        }
    }

    // --- Navigation and selection ---

    pub fn open_saved(&mut self) {
        self.screen = Screen::Saved;
        self.saved_selected = 0;
    }

    pub fn back_to_jobs(&mut self) {
        self.screen = Screen::Jobs;
    }

    pub fn select_next(&mut self) {
        let (cursor, len) = self.cursor_mut();
        if len != 0 && *cursor < len - 1 {
            *cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        let (cursor, _) = self.cursor_mut();
        if *cursor > 0 {
            *cursor -= 1;
        }
    }

    fn cursor_mut(&mut self) -> (&mut usize, usize) {
        match self.screen {
            Screen::Jobs => (&mut self.selected, self.filtered_jobs.len()),
            Screen::Saved => (&mut self.saved_selected, self.saved_jobs.len()),
        }
    }

    pub fn current_job(&self) -> Option<&Job> {
        self.filtered_jobs.get(self.selected)
    }

    pub fn current_saved(&self) -> Option<&Job> {
        self.saved_jobs.get(self.saved_selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobsPayload;

    fn job(id: &str, title: &str, company: &str) -> Job {
        Job {
            id: id.to_string(),
            title: title.to_string(),
            company_name: company.to_string(),
            main_category: "Engineering".to_string(),
            job_type: "Full-time".to_string(),
            work_model: "Remote".to_string(),
            seniority_level: "Senior".to_string(),
        }
    }

    fn loaded_app(jobs: Vec<Job>) -> App {
        let mut app = App::new();
        app.finish_fetch(Ok(jobs));
        app
    }

    #[test]
    fn test_filter_is_order_preserving_subsequence() {
        let catalog = vec![
            job("1", "Backend Engineer", "Acme"),
            job("2", "Designer", "Globex"),
            job("3", "Frontend Engineer", "Initech"),
        ];

        let filtered = filter_catalog(&catalog, "engineer");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, "1");
        assert_eq!(filtered[1].id, "3");
    }

    #[test]
    fn test_filter_empty_term_is_identity() {
        let catalog = vec![job("1", "A", "X"), job("2", "B", "Y")];
        assert_eq!(filter_catalog(&catalog, ""), catalog);
        assert_eq!(filter_catalog(&catalog, "   "), catalog);
    }

    #[test]
    fn test_filter_matches_title_or_company_case_insensitive() {
        let catalog = vec![job("1", "Backend Engineer", "Acme")];

        assert_eq!(filter_catalog(&catalog, "acme").len(), 1);
        assert_eq!(filter_catalog(&catalog, "ACME").len(), 1);
        assert_eq!(filter_catalog(&catalog, "backend").len(), 1);
        assert_eq!(filter_catalog(&catalog, "globex").len(), 0);
    }

    #[test]
    fn test_set_search_term_recomputes_view() {
        let mut app = loaded_app(vec![
            job("1", "Backend Engineer", "Acme"),
            job("2", "Designer", "Globex"),
        ]);

        app.set_search_term("acme");
        assert_eq!(app.filtered_jobs.len(), 1);
        assert_eq!(app.filtered_jobs[0].id, "1");

        app.set_search_term("");
        assert_eq!(app.filtered_jobs.len(), 2);
    }

    #[test]
    fn test_search_editing_clamps_selection() {
        let mut app = loaded_app(vec![
            job("1", "Backend Engineer", "Acme"),
            job("2", "Designer", "Globex"),
            job("3", "Frontend Engineer", "Initech"),
        ]);
        app.selected = 2;

        for c in "acme".chars() {
            app.search_push(c);
        }
        assert_eq!(app.filtered_jobs.len(), 1);
        assert_eq!(app.selected, 0);

        app.search_pop();
        assert_eq!(app.search_term, "acm");
    }

    #[test]
    fn test_toggle_save_is_an_involution() {
        let mut app = App::new();
        let posting = job("1", "Backend Engineer", "Acme");

        app.toggle_save(&posting);
        assert_eq!(app.saved_jobs.len(), 1);
        assert!(app.is_saved(&posting));

        app.toggle_save(&posting);
        assert!(app.saved_jobs.is_empty());
        assert!(!app.is_saved(&posting));
    }

    #[test]
    fn test_saved_order_is_append_order() {
        let mut app = App::new();
        let a = job("1", "A", "X");
        let b = job("2", "B", "Y");
        let c = job("3", "C", "Z");

        app.toggle_save(&a);
        app.toggle_save(&b);
        app.toggle_save(&c);
        app.toggle_save(&b); // un-save the middle one

        let ids: Vec<&str> = app.saved_jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn test_removal_gate_confirm() {
        let mut app = App::new();
        let a = job("1", "A", "X");
        let b = job("2", "B", "Y");
        app.toggle_save(&a);
        app.toggle_save(&b);

        app.request_removal(a.clone());
        assert!(app.pending_removal.is_some());

        app.confirm_removal();
        assert!(app.pending_removal.is_none());
        assert!(app.saved_jobs.iter().all(|saved| saved.id != "1"));
        assert_eq!(app.saved_jobs.len(), 1);
    }

    #[test]
    fn test_removal_gate_cancel_leaves_saved_set_alone() {
        let mut app = App::new();
        let a = job("1", "A", "X");
        app.toggle_save(&a);

        app.request_removal(a);
        app.cancel_removal();

        assert!(app.pending_removal.is_none());
        assert_eq!(app.saved_jobs.len(), 1);
    }

    #[test]
    fn test_confirm_with_idle_gate_is_a_noop() {
        let mut app = App::new();
        app.toggle_save(&job("1", "A", "X"));
        app.confirm_removal();
        assert_eq!(app.saved_jobs.len(), 1);
    }

    #[test]
    fn test_removal_is_visible_from_the_jobs_screen() {
        // The bookmark marker on the jobs screen reads the same saved set
        // the saved screen mutates
        let posting = job("1", "Backend Engineer", "Acme");
        let mut app = loaded_app(vec![posting.clone()]);
        app.toggle_save(&posting);
        app.open_saved();

        app.request_removal(posting.clone());
        app.confirm_removal();
        app.back_to_jobs();

        assert!(!app.is_saved(&posting));
    }

    #[test]
    fn test_fetch_success_populates_catalog_and_view() {
        let app = loaded_app(vec![job("1", "A", "X"), job("2", "B", "Y")]);
        assert!(!app.loading);
        assert_eq!(app.jobs.len(), 2);
        assert_eq!(app.filtered_jobs, app.jobs);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_fetch_empty_catalog_raises_no_notice() {
        let app = loaded_app(vec![]);
        assert!(app.jobs.is_empty());
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_fetch_missing_jobs_key_raises_notice() {
        let mut app = App::new();
        app.finish_fetch(Err(FetchError::MissingJobs));
        assert!(!app.loading);
        assert!(app.jobs.is_empty());
        assert_eq!(app.notice.as_deref(), Some("No jobs found in the response."));
    }

    #[test]
    fn test_fetch_decode_failure_raises_notice() {
        let decode_err: FetchError = serde_json::from_str::<JobsPayload>("nope")
            .unwrap_err()
            .into();
        let mut app = App::new();
        app.finish_fetch(Err(decode_err));
        assert_eq!(app.notice.as_deref(), Some("Failed to fetch jobs."));
    }

    #[test]
    fn test_open_apply_starts_with_a_blank_form() {
        let mut app = App::new();
        app.open_apply(job("1", "A", "X"));

        let modal = app.apply_modal.as_ref().unwrap();
        assert!(modal.form.name.is_empty());
        assert!(modal.form.errors.is_clear());
        assert_eq!(modal.focus, FormField::Name);
        assert!(modal.close_at.is_none());
    }

    #[test]
    fn test_invalid_submit_keeps_modal_open_with_inputs() {
        let mut app = App::new();
        app.open_apply(job("1", "A", "X"));
        {
            let modal = app.apply_modal.as_mut().unwrap();
            modal.form.name = "Jane".to_string();
        }

        app.submit_apply(Instant::now());

        let modal = app.apply_modal.as_ref().unwrap();
        assert!(modal.close_at.is_none());
        assert_eq!(modal.form.name, "Jane");
        assert!(modal.form.errors.email.is_some());
    }

    #[test]
    fn test_valid_submit_arms_the_delayed_close() {
        let mut app = App::new();
        app.open_apply(job("1", "A", "X"));
        {
            let modal = app.apply_modal.as_mut().unwrap();
            modal.form.name = "Jane Doe".to_string();
            modal.form.email = "jane@example.com".to_string();
            modal.form.contact_number = "09123456789".to_string();
            modal.form.why_hire = "because".to_string();
        }

        let now = Instant::now();
        app.submit_apply(now);

        let modal = app.apply_modal.as_ref().unwrap();
        assert_eq!(modal.close_at, Some(now + SUBMIT_CLOSE_DELAY));
        assert_eq!(
            modal.form.feedback_message,
            crate::form::FEEDBACK_SUBMITTED
        );

        // Not due yet
        app.tick(now + Duration::from_secs(1));
        assert!(app.apply_modal.is_some());

        // Due
        app.tick(now + SUBMIT_CLOSE_DELAY);
        assert!(app.apply_modal.is_none());
    }

    #[test]
    fn test_saved_screen_apply_returns_to_jobs_after_close() {
        let posting = job("1", "A", "X");
        let mut app = App::new();
        app.toggle_save(&posting);
        app.open_saved();
        app.open_apply(posting);
        {
            let modal = app.apply_modal.as_mut().unwrap();
            modal.form.name = "Jane Doe".to_string();
            modal.form.email = "jane@example.com".to_string();
            modal.form.contact_number = "09123456789".to_string();
            modal.form.why_hire = "because".to_string();
        }

        let now = Instant::now();
        app.submit_apply(now);
        app.tick(now + SUBMIT_CLOSE_DELAY);

        assert!(app.apply_modal.is_none());
        assert_eq!(app.screen, Screen::Jobs);
    }

    #[test]
    fn test_manual_close_discards_the_pending_deadline() {
        let mut app = App::new();
        app.open_saved();
        app.open_apply(job("1", "A", "X"));
        {
            let modal = app.apply_modal.as_mut().unwrap();
            modal.form.name = "Jane Doe".to_string();
            modal.form.email = "jane@example.com".to_string();
            modal.form.contact_number = "09123456789".to_string();
            modal.form.why_hire = "because".to_string();
        }

        let now = Instant::now();
        app.submit_apply(now);
        app.close_apply();

        // The old deadline passing must not re-close or navigate
        app.tick(now + SUBMIT_CLOSE_DELAY);
        assert!(app.apply_modal.is_none());
        assert_eq!(app.screen, Screen::Saved);
    }

    #[test]
    fn test_tick_without_a_deadline_is_a_noop() {
        let mut app = App::new();
        app.open_apply(job("1", "A", "X"));
        app.tick(Instant::now() + Duration::from_secs(60));
        assert!(app.apply_modal.is_some());
    }

    #[test]
    fn test_selection_moves_within_bounds_per_screen() {
        let mut app = loaded_app(vec![job("1", "A", "X"), job("2", "B", "Y")]);

        app.select_next();
        assert_eq!(app.selected, 1);
        app.select_next(); // already at the end
        assert_eq!(app.selected, 1);
        app.select_prev();
        assert_eq!(app.selected, 0);

        app.toggle_save(&job("3", "C", "Z"));
        app.open_saved();
        app.select_next(); // single saved job
        assert_eq!(app.saved_selected, 0);
    }

    #[test]
    fn test_confirm_removal_clamps_saved_cursor() {
        let mut app = App::new();
        let a = job("1", "A", "X");
        let b = job("2", "B", "Y");
        app.toggle_save(&a);
        app.toggle_save(&b);
        app.open_saved();
        app.saved_selected = 1;

        app.request_removal(b);
        app.confirm_removal();
        assert_eq!(app.saved_selected, 0);
    }
}
