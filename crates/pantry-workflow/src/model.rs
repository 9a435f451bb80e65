use std::fmt;
use std::path::Path;

use bytes::Bytes;

use crate::errors::WorkflowError;

/// Identifier minted on every file selection.
///
/// Calls capture the id at issue time; results carrying a stale id are
/// dropped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Creates a fresh random session id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Remote stage of a session; used to tag failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Uploading,
    GeneratingRecipes,
}

/// Discrete state of the upload-to-recipe cycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "phase", content = "stage", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Detected,
    GeneratingRecipes,
    Complete,
    Failed(Stage),
}

impl Phase {
    /// `Complete` and `Failed` end a session; only a new selection restarts.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }

    /// True while a remote call for the session is outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Uploading | Self::Detected | Self::GeneratingRecipes
        )
    }
}

/// A video chosen by the user.
///
/// No format validation happens here; the content type is only a hint sent
/// along with the multipart field.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct VideoFile {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Bytes,
}

impl VideoFile {
    /// Wraps in-memory video bytes.
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Reads a video from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| WorkflowError::File(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();
        Ok(Self::from_bytes(file_name, bytes))
    }

    /// Overrides the guessed content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Payload size in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// One detected ingredient.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Detection confidence in `[0, 1]`; `None` when missing or invalid.
    pub confidence: Option<f64>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }

    /// Confidence as a rounded percentage.
    pub fn confidence_percent(&self) -> Option<u8> {
        self.confidence
            .map(|c| (c.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    /// `"90%"`, or `"N/A"` when the confidence is unknown.
    pub fn confidence_label(&self) -> String {
        match self.confidence_percent() {
            Some(pct) => format!("{pct}%"),
            None => "N/A".to_string(),
        }
    }
}

/// A recipe with named fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StructuredRecipe {
    pub name: String,
    pub ingredients_used: Vec<String>,
    pub instructions: Vec<String>,
}

/// A recipe as returned by the generation service, decoded once at the
/// response boundary.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RecipeItem {
    Structured(StructuredRecipe),
    /// Opaque text shown verbatim.
    Raw(String),
}

impl RecipeItem {
    pub fn as_structured(&self) -> Option<&StructuredRecipe> {
        match self {
            Self::Structured(recipe) => Some(recipe),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for RecipeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(text) => f.write_str(text),
            Self::Structured(recipe) => {
                writeln!(f, "{}", recipe.name)?;
                writeln!(f, "Ingredients used:")?;
                for ingredient in &recipe.ingredients_used {
                    writeln!(f, "  - {ingredient}")?;
                }
                write!(f, "Instructions:")?;
                for (i, step) in recipe.instructions.iter().enumerate() {
                    write!(f, "\n  {}. {step}", i + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_label_rounds_or_reports_unknown() {
        assert_eq!(Ingredient::new("tomato", Some(0.904)).confidence_label(), "90%");
        assert_eq!(Ingredient::new("egg", Some(0.005)).confidence_label(), "1%");
        assert_eq!(Ingredient::new("salt", None).confidence_label(), "N/A");
    }

    #[test]
    fn phase_terminal_and_in_flight_sets() {
        assert!(Phase::Complete.is_terminal());
        assert!(Phase::Failed(Stage::Uploading).is_terminal());
        assert!(!Phase::Idle.is_terminal());
        assert!(Phase::Detected.is_in_flight());
        assert!(!Phase::Failed(Stage::GeneratingRecipes).is_in_flight());
    }

    #[test]
    fn phase_serializes_with_failed_stage() {
        let value = serde_json::to_value(Phase::Failed(Stage::Uploading)).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"phase": "failed", "stage": "uploading"})
        );
    }

    #[test]
    fn content_type_is_guessed_from_extension() {
        assert_eq!(VideoFile::from_bytes("pantry.MP4", vec![1]).content_type, "video/mp4");
        assert_eq!(
            VideoFile::from_bytes("clip", vec![1]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn structured_recipe_display_numbers_steps() {
        let item = RecipeItem::Structured(StructuredRecipe {
            name: "Omelette".into(),
            ingredients_used: vec!["egg".into()],
            instructions: vec!["Beat eggs".into(), "Cook".into()],
        });
        assert_eq!(
            item.to_string(),
            "Omelette\nIngredients used:\n  - egg\nInstructions:\n  1. Beat eggs\n  2. Cook"
        );
        assert_eq!(RecipeItem::Raw("Tomato Soup".into()).to_string(), "Tomato Soup");
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shelf.webm");
        std::fs::write(&path, b"abc").expect("write");
        let file = VideoFile::from_path(&path).await.expect("read");
        assert_eq!(file.file_name, "shelf.webm");
        assert_eq!(file.content_type, "video/webm");
        assert_eq!(file.len(), 3);
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let err = VideoFile::from_path("/definitely/not/here.mp4").await;
        assert!(matches!(err, Err(WorkflowError::File(msg)) if msg.contains("here.mp4")));
    }
}
