use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a visit-processing job.
///
/// Transitions are `Pending -> Ongoing -> {Completed, Failed}`; the two
/// terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Ongoing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One batch processing request spanning multiple store visits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "job_id")]
    pub id: String,
    pub status: JobStatus,
    #[serde(rename = "count")]
    pub visit_count: usize,
    pub visits: Vec<Visit>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JobError>,
}

/// One store-scoped group of images within a job.
///
/// `visit_time` is an opaque client token carried through untouched.
/// `results` starts empty and is allocated to the image count once the
/// store is confirmed known; a visit whose store is unknown keeps it empty.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Visit {
    #[garde(length(min = 1))]
    pub store_id: String,
    #[serde(rename = "image_url", default)]
    #[garde(skip)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    #[garde(skip)]
    pub visit_time: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[garde(skip)]
    pub results: Vec<ImageResult>,
}

/// Outcome slot for a single image, written exactly once by the task that
/// processed it. `perimeter` is meaningful only when `processed` is true.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    pub perimeter: f64,
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A job-level failure, tagged with the store it occurred under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub store_id: String,
    pub error: String,
}

/// Body of `POST /api/submit`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitJobRequest {
    #[serde(default)]
    #[garde(range(min = 1))]
    pub count: usize,
    #[serde(default)]
    #[garde(length(min = 1), dive)]
    pub visits: Vec<Visit>,
}

/// Response to a successful submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
}

/// Narrow status projection served to polling clients. Per-image results
/// stay in the retained job record; the error list is attached only for
/// failed jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    pub job_id: String,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<JobError>>,
}
