use crate::model::Stage;

/// Backend endpoint that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// `POST /api/upload`
    Upload,
    /// `POST /api/recipes`
    Recipes,
}

impl Endpoint {
    /// Request path relative to the backend base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Upload => "/api/upload",
            Self::Recipes => "/api/recipes",
        }
    }

    /// Workflow stage that owns calls to this endpoint.
    pub fn stage(self) -> Stage {
        match self {
            Self::Upload => Stage::Uploading,
            Self::Recipes => Stage::GeneratingRecipes,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Errors returned by a backend implementation before they are mapped onto
/// the workflow taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Network, timeout or body streaming failure.
    #[error("transport error ({endpoint}): {message}")]
    Transport { endpoint: Endpoint, message: String },
    /// Backend answered with a status other than 200.
    #[error("unexpected status {status} from {endpoint}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },
    /// Body could not be read as JSON.
    #[error("undecodable response from {endpoint}: {message}")]
    Decode { endpoint: Endpoint, message: String },
}

impl BackendError {
    /// Creates a transport-level error.
    pub fn transport(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint,
            message: message.into(),
        }
    }

    /// Creates a status error.
    pub fn status(endpoint: Endpoint, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            endpoint,
            status,
            body: body.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint,
            message: message.into(),
        }
    }

    /// Returns the endpoint associated with this error.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => *endpoint,
        }
    }
}

/// Top-level error type for the workflow API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// Submit was called without a selected file.
    #[error("validation error: {0}")]
    Validation(String),
    /// A call for the current session is still in flight.
    #[error("a submission is already in progress")]
    Busy,
    /// The current session already reached `Complete` or `Failed`.
    #[error("session finished; select a new video to start again")]
    SessionFinished,
    /// A newer file selection replaced the session this call belonged to.
    #[error("session superseded by a newer file selection")]
    Superseded,
    /// Network failure while uploading.
    #[error("upload transport error: {0}")]
    UploadTransport(String),
    /// Upload endpoint answered with a non-OK status.
    #[error("upload failed with status {status}: {body}")]
    UploadStatus { status: u16, body: String },
    /// Network failure while generating recipes.
    #[error("recipe generation transport error: {0}")]
    GenerationTransport(String),
    /// Recipe endpoint answered with a non-OK status.
    #[error("recipe generation failed with status {status}: {body}")]
    GenerationStatus { status: u16, body: String },
    /// Response JSON did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// Invalid workflow or backend configuration.
    #[error("config error: {0}")]
    Config(String),
    /// A video file could not be read.
    #[error("file error: {0}")]
    File(String),
}

impl WorkflowError {
    pub(crate) fn no_file_selected() -> Self {
        Self::Validation("no file selected".into())
    }
}

impl From<BackendError> for WorkflowError {
    fn from(value: BackendError) -> Self {
        match (value.endpoint(), value) {
            (Endpoint::Upload, BackendError::Status { status, body, .. }) => {
                Self::UploadStatus { status, body }
            }
            (Endpoint::Recipes, BackendError::Status { status, body, .. }) => {
                Self::GenerationStatus { status, body }
            }
            (Endpoint::Upload, BackendError::Transport { message, .. }) => {
                Self::UploadTransport(message)
            }
            (Endpoint::Recipes, BackendError::Transport { message, .. }) => {
                Self::GenerationTransport(message)
            }
            (Endpoint::Upload, BackendError::Decode { message, .. }) => {
                Self::UploadTransport(format!("undecodable body: {message}"))
            }
            (Endpoint::Recipes, BackendError::Decode { message, .. }) => {
                Self::GenerationTransport(format!("undecodable body: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_status_maps_to_stage_specific_variant() {
        let upload: WorkflowError = BackendError::status(Endpoint::Upload, 500, "boom").into();
        assert_eq!(
            upload,
            WorkflowError::UploadStatus {
                status: 500,
                body: "boom".into()
            }
        );
        let recipes: WorkflowError = BackendError::status(Endpoint::Recipes, 502, "").into();
        assert!(matches!(
            recipes,
            WorkflowError::GenerationStatus { status: 502, .. }
        ));
    }

    #[test]
    fn decode_errors_count_as_transport_failures_of_their_stage() {
        let err: WorkflowError = BackendError::decode(Endpoint::Recipes, "eof").into();
        assert!(matches!(err, WorkflowError::GenerationTransport(msg) if msg.contains("eof")));
    }

    #[test]
    fn endpoint_paths_and_stages() {
        assert_eq!(Endpoint::Upload.to_string(), "/api/upload");
        assert_eq!(Endpoint::Recipes.stage(), Stage::GeneratingRecipes);
    }
}
