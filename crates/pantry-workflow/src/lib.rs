//! Client-side orchestration for the pantry-to-recipe flow.
//!
//! A user selects a short pantry video; [`UploadWorkflow::submit`] uploads it
//! for ingredient detection and, as soon as detection succeeds, asks the
//! recipe service for recipes using the detected names. Progress, results and
//! failures are published as [`Session`] snapshots through a `watch` channel
//! and reported to a [`Notifier`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pantry_workflow::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), WorkflowError> {
//! let workflow = UploadWorkflow::builder()
//!     .backend(Arc::new(HttpBackend::new(BackendConfig::new("http://localhost:3000"))?))
//!     .build()?;
//!
//! workflow.select_file(VideoFile::from_path("pantry.mp4").await?);
//! let session = workflow.submit().await?;
//! for recipe in session.recipes() {
//!     println!("{recipe}");
//! }
//! # Ok(())
//! # }
//! ```

/// Backend contract, progress reporting and the HTTP implementation.
pub mod backend;
/// HTTP backend configuration.
pub mod config;
/// Error taxonomy.
pub mod errors;
/// Session data model: phases, videos, ingredients, recipes.
pub mod model;
/// Response-shape normalization.
pub mod normalize;
/// User-visible notifications.
pub mod notify;
/// Logging setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Preview handles for the selected video.
pub mod preview;
/// Published session state.
pub mod session;
/// The upload → detection → recipe workflow.
pub mod workflow;

pub use backend::{HttpBackend, PantryBackend, ProgressSink, UploadProgress};
pub use config::BackendConfig;
pub use errors::{BackendError, Endpoint, WorkflowError};
pub use model::{Ingredient, Phase, RecipeItem, SessionId, Stage, StructuredRecipe, VideoFile};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use observability::init_observability;
pub use preview::{ObjectUrlStore, PreviewLease, PreviewRef, PreviewStore};
pub use session::Session;
pub use workflow::{UploadWorkflow, UploadWorkflowBuilder};
