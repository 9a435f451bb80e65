use std::pin::Pin;

use bytes::Bytes;
use futures::StreamExt as _;
use futures::stream;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::{PantryBackend, ProgressSink, UploadProgress};
use crate::config::BackendConfig;
use crate::errors::{BackendError, Endpoint, WorkflowError};
use crate::model::VideoFile;

const VIDEO_FIELD: &str = "video";

type ChunkStream =
    Pin<Box<dyn futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static>>;

/// Backend talking to the pantry HTTP API.
pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Creates a backend from explicit configuration.
    pub fn new(config: BackendConfig) -> Result<Self, WorkflowError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WorkflowError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a backend using `PANTRY_API_BASE_URL`.
    pub fn from_env() -> Result<Self, WorkflowError> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl PantryBackend for HttpBackend {
    async fn upload(
        &self,
        video: &VideoFile,
        progress: ProgressSink,
    ) -> Result<serde_json::Value, BackendError> {
        let endpoint = Endpoint::Upload;
        let total = video.len();
        debug!(file = %video.file_name, bytes = total, "uploading video");

        let body = reqwest::Body::wrap_stream(progress_chunks(
            video.bytes.clone(),
            self.config.upload_chunk_size,
            progress,
        ));
        let part = Part::stream_with_length(body, total)
            .file_name(video.file_name.clone())
            .mime_str(&video.content_type)
            .map_err(|e| {
                BackendError::transport(
                    endpoint,
                    format!("invalid content type {:?}: {e}", video.content_type),
                )
            })?;
        let form = Form::new().part(VIDEO_FIELD, part);

        let response = self
            .client
            .post(self.config.endpoint_url(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::transport(endpoint, format!("upload request failed: {e}")))?;
        read_json(endpoint, response).await
    }

    async fn generate_recipes(&self, names: &[String]) -> Result<serde_json::Value, BackendError> {
        let endpoint = Endpoint::Recipes;
        debug!(count = names.len(), "requesting recipes");
        let response = self
            .client
            .post(self.config.endpoint_url(endpoint))
            .json(&serde_json::json!({ "ingredients": names }))
            .send()
            .await
            .map_err(|e| {
                BackendError::transport(endpoint, format!("recipe request failed: {e}"))
            })?;
        read_json(endpoint, response).await
    }
}

/// Splits the payload into chunks and reports cumulative progress as each
/// chunk is pulled by the transport.
fn progress_chunks(bytes: Bytes, chunk_size: usize, progress: ProgressSink) -> ChunkStream {
    let total = bytes.len() as u64;
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Bytes> = (0..bytes.len())
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..(start + chunk_size).min(bytes.len())))
        .collect();
    let mut sent = 0_u64;
    Box::pin(stream::iter(chunks).map(move |chunk| {
        sent = sent.saturating_add(chunk.len() as u64);
        progress(UploadProgress {
            sent,
            total: Some(total),
        });
        Ok::<_, std::io::Error>(chunk)
    }))
}

async fn read_json(
    endpoint: Endpoint,
    response: reqwest::Response,
) -> Result<serde_json::Value, BackendError> {
    let status = response.status();
    if status != StatusCode::OK {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(BackendError::status(endpoint, status.as_u16(), body));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BackendError::transport(endpoint, format!("failed to read body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::decode(endpoint, e.to_string()))
}
