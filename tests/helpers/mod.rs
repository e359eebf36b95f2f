//! Shared test fixtures: a scripted image worker, catalog data, and
//! polling helpers.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use store_visit_processor::app_state::AppState;
use store_visit_processor::models::job::{JobStatusResponse, SubmitJobRequest, Visit};
use store_visit_processor::models::store::Store;
use store_visit_processor::services::engine::JobEngine;
use store_visit_processor::services::processor::{ImageWorker, ProcessError};
use store_visit_processor::services::store_catalog::StoreCatalog;

/// Image worker with scripted outcomes: any URL containing "broken" fails
/// with a 404-shaped error, everything else succeeds with a perimeter
/// derived from the URL length. An optional delay stands in for network
/// latency.
pub struct ScriptedWorker {
    delay: Option<Duration>,
}

impl ScriptedWorker {
    pub fn instant() -> Self {
        Self { delay: None }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }
}

#[async_trait]
impl ImageWorker for ScriptedWorker {
    async fn process(&self, url: &str) -> Result<f64, ProcessError> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if url.contains("broken") {
            Err(ProcessError::Status(reqwest::StatusCode::NOT_FOUND))
        } else {
            Ok((url.len() * 2) as f64)
        }
    }
}

fn store(id: &str, name: &str) -> Store {
    Store {
        store_id: id.to_string(),
        store_name: name.to_string(),
        area_code: "7100015".to_string(),
    }
}

pub fn test_catalog() -> StoreCatalog {
    StoreCatalog::from_stores([
        store("RP00001", "Best Corner"),
        store("RP00002", "Madhu Super Mart"),
    ])
}

pub fn test_state(worker: ScriptedWorker) -> AppState {
    AppState::new(test_catalog(), Arc::new(worker))
}

pub fn visit(store_id: &str, image_urls: &[&str]) -> Visit {
    Visit {
        store_id: store_id.to_string(),
        image_urls: image_urls.iter().map(|url| url.to_string()).collect(),
        visit_time: "2024-03-11T10:00:00Z".to_string(),
        results: Vec::new(),
    }
}

pub fn request(visits: Vec<Visit>) -> SubmitJobRequest {
    SubmitJobRequest {
        count: visits.len(),
        visits,
    }
}

/// Poll a job's status until it reaches a terminal state, or panic after
/// a generous timeout.
pub async fn wait_for_terminal(engine: &JobEngine, job_id: &str) -> JobStatusResponse {
    for _ in 0..500 {
        let status = engine.get_job_status(job_id).expect("job exists");
        if status.status.is_terminal() {
            return status;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} did not reach a terminal status in time");
}
