use std::sync::Arc;

use crate::services::engine::JobEngine;
use crate::services::job_store::JobStore;
use crate::services::processor::ImageWorker;
use crate::services::store_catalog::StoreCatalog;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: JobEngine,
    pub jobs: Arc<JobStore>,
    pub catalog: Arc<StoreCatalog>,
}

impl AppState {
    pub fn new(catalog: StoreCatalog, worker: Arc<dyn ImageWorker>) -> Self {
        let jobs = Arc::new(JobStore::new());
        let catalog = Arc::new(catalog);
        let engine = JobEngine::new(Arc::clone(&jobs), Arc::clone(&catalog), worker);
        Self {
            engine,
            jobs,
            catalog,
        }
    }
}
