//! Common imports for typical workflow usage.
pub use crate::{
    BackendConfig, HttpBackend, Ingredient, Notification, NotificationLevel, Notifier,
    PantryBackend, Phase, RecipeItem, Session, SessionId, Stage, StructuredRecipe,
    UploadWorkflow, VideoFile, WorkflowError,
};
