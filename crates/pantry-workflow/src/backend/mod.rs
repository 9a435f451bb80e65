//! Backend contract used by the workflow, plus the reqwest implementation.
//!
//! Implementations return the raw JSON body of a 200 response; shape
//! normalization happens in [`crate::normalize`].
mod http;

use std::sync::Arc;

use crate::errors::BackendError;
use crate::model::VideoFile;

pub use http::HttpBackend;

/// Bytes handed to the transport so far for one upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    /// `None` when the transport cannot tell the payload size.
    pub total: Option<u64>,
}

impl UploadProgress {
    /// `round(sent * 100 / total)` clamped to `[0, 100]`.
    ///
    /// Returns `None` when the total is unknown or zero; callers report
    /// indeterminate progress instead of inventing a percentage.
    pub fn percent(&self) -> Option<u8> {
        let total = u128::from(self.total.filter(|t| *t > 0)?);
        let sent = u128::from(self.sent);
        let pct = (sent * 100 + total / 2) / total;
        Some(pct.min(100) as u8)
    }
}

/// Callback receiving upload progress. Called from the transport task.
pub type ProgressSink = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Remote ingredient-detection and recipe-generation services.
#[async_trait::async_trait]
pub trait PantryBackend: Send + Sync {
    /// Sends the video as multipart field `video` to `/api/upload`.
    async fn upload(
        &self,
        video: &VideoFile,
        progress: ProgressSink,
    ) -> Result<serde_json::Value, BackendError>;

    /// Posts `{ingredients: names}` to `/api/recipes`.
    async fn generate_recipes(&self, names: &[String]) -> Result<serde_json::Value, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(sent: u64, total: Option<u64>) -> UploadProgress {
        UploadProgress { sent, total }
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(progress(0, Some(200)).percent(), Some(0));
        assert_eq!(progress(1, Some(3)).percent(), Some(33));
        assert_eq!(progress(2, Some(3)).percent(), Some(67));
        assert_eq!(progress(300, Some(200)).percent(), Some(100));
        assert_eq!(progress(u64::MAX, Some(u64::MAX)).percent(), Some(100));
    }

    #[test]
    fn percent_is_unknown_without_total() {
        assert_eq!(progress(512, None).percent(), None);
        assert_eq!(progress(512, Some(0)).percent(), None);
    }
}
