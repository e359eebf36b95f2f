use dashmap::DashMap;

use crate::models::job::Job;

/// In-memory job record store.
///
/// Jobs do not survive a restart; the map is the system of record for the
/// process lifetime. The sharded map keeps create/get/update safe under
/// concurrent access from many job runs and the status-query path at once.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<String, Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created job, returning its identifier.
    pub fn create(&self, job: Job) -> String {
        let id = job.id.clone();
        self.jobs.insert(id.clone(), job);
        id
    }

    /// Fetch a snapshot of a job by identifier.
    pub fn get(&self, id: &str) -> Result<Job, JobStoreError> {
        self.jobs
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(JobStoreError::NotFound)
    }

    /// Replace a job record wholesale. The record must already exist.
    pub fn update(&self, job: Job) -> Result<(), JobStoreError> {
        match self.jobs.get_mut(&job.id) {
            Some(mut entry) => {
                *entry = job;
                Ok(())
            }
            None => Err(JobStoreError::NotFound),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("job not found")]
    NotFound,
}
