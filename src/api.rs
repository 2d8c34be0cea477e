use thiserror::Error;

use crate::models::{Job, JobsPayload};

pub const DEFAULT_ENDPOINT: &str = "https://empllo.com/api/v1";

/// Failure kinds at the fetch boundary. `MissingJobs` means the payload
/// decoded but had no `jobs` key; everything else is a transport or decode
/// problem. An empty `jobs` array is not an error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no jobs in response")]
    MissingJobs,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// User-facing notice text for this failure.
    pub fn notice(&self) -> &'static str {
        match self {
            FetchError::MissingJobs => "No jobs found in the response.",
            FetchError::Transport(_) | FetchError::Decode(_) => "Failed to fetch jobs.",
        }
    }
}

/// Source of job postings. The HTTP implementation is the only one in
/// production; tests substitute canned sources.
pub trait JobSource {
    fn fetch_jobs(&self) -> Result<Vec<Job>, FetchError>;
}

pub struct HttpJobSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpJobSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl JobSource for HttpJobSource {
    fn fetch_jobs(&self) -> Result<Vec<Job>, FetchError> {
        tracing::debug!(endpoint = %self.endpoint, "fetching job catalog");
        let body = self
            .client
            .get(&self.endpoint)
            .send()?
            .error_for_status()?
            .text()?;
        decode_jobs(&body)
    }
}

/// Decodes a catalog payload and assigns each record a fresh session id.
/// Ids are random 128-bit values; uniqueness is only needed within one
/// fetch session, so refetching reassigns ids to identical postings.
pub fn decode_jobs(body: &str) -> Result<Vec<Job>, FetchError> {
    let payload: JobsPayload = serde_json::from_str(body)?;
    let records = payload.jobs.ok_or(FetchError::MissingJobs)?;

    let jobs: Vec<Job> = records
        .into_iter()
        .map(|record| Job {
            id: format!("{:032x}", rand::random::<u128>()),
            title: record.title,
            company_name: record.company_name,
            main_category: record.main_category,
            job_type: record.job_type,
            work_model: record.work_model,
            seniority_level: record.seniority_level,
        })
        .collect();

    tracing::debug!(count = jobs.len(), "decoded job catalog");
    Ok(jobs)
}
