use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use tokio::time::sleep;

/// The per-image unit of work: turn an image reference into a perimeter
/// measurement, or fail. The engine depends only on this contract.
#[async_trait]
pub trait ImageWorker: Send + Sync {
    async fn process(&self, url: &str) -> Result<f64, ProcessError>;
}

/// Production image worker: downloads the image, decodes its dimensions,
/// and computes the perimeter.
pub struct HttpImageProcessor {
    http: Client,
}

impl HttpImageProcessor {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for HttpImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageWorker for HttpImageProcessor {
    async fn process(&self, url: &str) -> Result<f64, ProcessError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProcessError::Status(response.status()));
        }
        let bytes = response.bytes().await?;

        let perimeter = decode_perimeter(&bytes)?;

        // Simulated GPU processing latency, 100-400ms uniform.
        let delay_ms = rand::rng().random_range(100..=400);
        sleep(Duration::from_millis(delay_ms)).await;

        Ok(perimeter)
    }
}

/// Decode an encoded image and compute `2 * (width + height)`.
fn decode_perimeter(bytes: &[u8]) -> Result<f64, ProcessError> {
    let img = image::load_from_memory(bytes)?;
    Ok(2.0 * f64::from(img.width() + img.height()))
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to download image: {0}")]
    Download(#[from] reqwest::Error),

    #[error("failed to download image, status code: {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
