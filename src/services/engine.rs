use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::models::job::{
    ImageResult, Job, JobError, JobStatus, JobStatusResponse, SubmitJobRequest,
};
use crate::services::job_store::{JobStore, JobStoreError};
use crate::services::processor::ImageWorker;
use crate::services::store_catalog::StoreCatalog;

/// Owns the job lifecycle: validates submissions, runs the concurrent
/// fan-out over visits and images, aggregates partial failures, and
/// commits the terminal state back to the job store.
#[derive(Clone)]
pub struct JobEngine {
    jobs: Arc<JobStore>,
    catalog: Arc<StoreCatalog>,
    worker: Arc<dyn ImageWorker>,
}

/// Mutable state shared by every image task of one run. All writes go
/// through this single lock; a task never observes a torn record.
struct RunState {
    job: Job,
    failed: bool,
}

impl JobEngine {
    pub fn new(jobs: Arc<JobStore>, catalog: Arc<StoreCatalog>, worker: Arc<dyn ImageWorker>) -> Self {
        Self {
            jobs,
            catalog,
            worker,
        }
    }

    /// Validate and register a new job, then schedule its run onto the
    /// runtime. Returns the job identifier immediately; the caller never
    /// waits on processing.
    pub fn create_job(&self, request: SubmitJobRequest) -> Result<String, EngineError> {
        if request.count == 0 {
            return Err(EngineError::EmptyJob);
        }
        if request.count != request.visits.len() {
            return Err(EngineError::CountMismatch);
        }

        let job_id = Uuid::new_v4().to_string();
        let job = Job {
            id: job_id.clone(),
            status: JobStatus::Pending,
            visit_count: request.count,
            visits: request.visits,
            created_at: Utc::now(),
            completed_at: None,
            errors: Vec::new(),
        };

        tracing::info!(job_id = %job_id, visits = job.visit_count, "job submitted");
        self.jobs.create(job);
        counter!("visit_jobs_submitted_total").increment(1);

        let engine = self.clone();
        let run_id = job_id.clone();
        tokio::spawn(async move {
            engine.run(run_id).await;
        });

        Ok(job_id)
    }

    /// The narrow status projection: status and id, plus the error list
    /// only when the job failed.
    pub fn get_job_status(&self, job_id: &str) -> Result<JobStatusResponse, EngineError> {
        let job = self
            .jobs
            .get(job_id)
            .map_err(|_| EngineError::JobNotFound)?;

        let errors = match job.status {
            JobStatus::Failed => Some(job.errors),
            _ => None,
        };

        Ok(JobStatusResponse {
            status: job.status,
            job_id: job.id,
            errors,
        })
    }

    /// Execute one job to its terminal state.
    ///
    /// State machine: `pending -> ongoing -> {completed, failed}`. The
    /// ongoing transition is committed before any image task starts; the
    /// terminal transition is committed only after every spawned task has
    /// finished. A job that vanished between submission and run start
    /// aborts with no client-visible signal.
    async fn run(&self, job_id: String) {
        let mut job = match self.jobs.get(&job_id) {
            Ok(job) => job,
            Err(JobStoreError::NotFound) => {
                tracing::error!(job_id = %job_id, "job missing at run start, aborting");
                return;
            }
        };

        job.status = JobStatus::Ongoing;
        if self.jobs.update(job.clone()).is_err() {
            return;
        }

        let started = Instant::now();

        // Visit inputs are immutable for the whole run; snapshot them so
        // image tasks only take the lock to write their own slot.
        let visit_inputs: Vec<(String, Vec<String>)> = job
            .visits
            .iter()
            .map(|visit| (visit.store_id.clone(), visit.image_urls.clone()))
            .collect();

        let shared = Arc::new(Mutex::new(RunState { job, failed: false }));
        let mut tasks = JoinSet::new();

        for (visit_idx, (store_id, image_urls)) in visit_inputs.into_iter().enumerate() {
            if !self.catalog.contains(&store_id) {
                tracing::warn!(job_id = %job_id, store_id = %store_id, "unknown store, skipping visit");
                let mut run = shared.lock().await;
                run.job.errors.push(JobError {
                    store_id,
                    error: "store not found".to_string(),
                });
                run.failed = true;
                continue;
            }

            {
                let mut run = shared.lock().await;
                run.job.visits[visit_idx].results = vec![ImageResult::default(); image_urls.len()];
            }

            for (image_idx, url) in image_urls.into_iter().enumerate() {
                let worker = Arc::clone(&self.worker);
                let shared = Arc::clone(&shared);
                let store_id = store_id.clone();

                tasks.spawn(async move {
                    let image_started = Instant::now();
                    let outcome = worker.process(&url).await;
                    histogram!("visit_image_processing_seconds")
                        .record(image_started.elapsed().as_secs_f64());

                    match outcome {
                        Ok(perimeter) => {
                            counter!("visit_images_processed_total").increment(1);
                            let mut run = shared.lock().await;
                            run.job.visits[visit_idx].results[image_idx] = ImageResult {
                                url,
                                perimeter,
                                processed: true,
                                error: None,
                            };
                        }
                        Err(err) => {
                            counter!("visit_images_failed_total").increment(1);
                            let message = format!("failed to process image {url}: {err}");
                            let mut run = shared.lock().await;
                            run.job.visits[visit_idx].results[image_idx] = ImageResult {
                                url,
                                perimeter: 0.0,
                                processed: false,
                                error: Some(err.to_string()),
                            };
                            run.job.errors.push(JobError {
                                store_id,
                                error: message,
                            });
                            run.failed = true;
                        }
                    }
                });
            }
        }

        // Fan-in: the terminal transition waits for every image task.
        while tasks.join_next().await.is_some() {}

        let mut run = shared.lock().await;
        run.job.status = if run.failed {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };
        run.job.completed_at = Some(Utc::now());

        let status = run.job.status;
        match status {
            JobStatus::Failed => counter!("visit_jobs_failed_total").increment(1),
            _ => counter!("visit_jobs_completed_total").increment(1),
        }

        if let Err(err) = self.jobs.update(run.job.clone()) {
            tracing::error!(job_id = %job_id, error = %err, "failed to commit terminal job state");
            return;
        }

        tracing::info!(
            job_id = %job_id,
            status = %status,
            errors = run.job.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "job run finished"
        );
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("count does not match number of visits")]
    CountMismatch,

    #[error("job must contain at least one visit")]
    EmptyJob,

    #[error("job not found")]
    JobNotFound,
}
