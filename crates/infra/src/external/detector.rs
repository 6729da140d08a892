//! HTTP client for a remote ingredient detection model.
//!
//! The service receives the raw image as the request body and answers with
//! `{"objects": [{"label": .., "confidence": ..}], "annotated_image": [..]}`;
//! `annotated_image` is optional.

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, instrument};

use larder_ai::{AiError, Detection, IngredientDetector};

#[derive(Debug, Clone)]
pub struct HttpDetector {
    url: String,
    client: reqwest::Client,
    handle: Handle,
}

impl HttpDetector {
    /// Must be called inside a tokio runtime; `detect` runs on that runtime.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AiError> {
        let handle = Handle::try_current()
            .map_err(|_| AiError::Internal("HttpDetector requires a tokio runtime".to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
            handle,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, image: Vec<u8>) -> Result<Detection, AiError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| AiError::InferenceFailed(format!("detector request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::InferenceFailed(format!("detector answered {status}")));
        }

        response
            .json::<Detection>()
            .await
            .map_err(|e| AiError::InferenceFailed(format!("invalid detector response: {e}")))
    }
}

impl IngredientDetector for HttpDetector {
    /// Blocks the calling thread; call from `spawn_blocking`, never from an async task.
    #[instrument(skip(self, image), fields(url = %self.url, bytes = image.len()), err)]
    fn detect(&self, image: &[u8]) -> Result<Detection, AiError> {
        let detection = self.handle.block_on(self.post(image.to_vec()))?;
        debug!(objects = detection.objects.len(), "detector answered");
        Ok(detection)
    }
}
