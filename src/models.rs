use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String, // assigned at fetch time; the payload carries no stable id
    pub title: String,
    pub company_name: String,
    pub main_category: String,
    pub job_type: String,
    pub work_model: String,
    pub seniority_level: String,
}

/// Wire-side job record, before a session id is assigned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub main_category: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub work_model: String,
    #[serde(default)]
    pub seniority_level: String,
}

/// Catalog response payload. A missing `jobs` key and a present-but-empty
/// array are distinct cases at the fetch boundary.
#[derive(Debug, Deserialize)]
pub struct JobsPayload {
    #[serde(default)]
    pub jobs: Option<Vec<JobRecord>>,
}
