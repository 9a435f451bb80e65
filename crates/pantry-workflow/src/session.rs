use crate::backend::UploadProgress;
use crate::errors::WorkflowError;
use crate::model::{Ingredient, Phase, RecipeItem, SessionId, Stage, VideoFile};
use crate::preview::PreviewRef;

/// State of one upload-to-recipe cycle, as published to observers.
///
/// Only the workflow mutates a session; observers get clones.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) selected_file: Option<VideoFile>,
    pub(crate) preview: Option<PreviewRef>,
    pub(crate) upload_progress: u8,
    pub(crate) progress_indeterminate: bool,
    pub(crate) ingredients: Vec<Ingredient>,
    pub(crate) recipes: Vec<RecipeItem>,
    pub(crate) phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Idle session with nothing selected.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            selected_file: None,
            preview: None,
            upload_progress: 0,
            progress_indeterminate: false,
            ingredients: Vec::new(),
            recipes: Vec::new(),
            phase: Phase::Idle,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn selected_file(&self) -> Option<&VideoFile> {
        self.selected_file.as_ref()
    }

    /// Present exactly when a file is selected.
    pub fn preview(&self) -> Option<&PreviewRef> {
        self.preview.as_ref()
    }

    /// Upload percentage in `[0, 100]`.
    pub fn upload_progress(&self) -> u8 {
        self.upload_progress
    }

    /// True when the upload size is unknown and no percentage is available.
    pub fn progress_indeterminate(&self) -> bool {
        self.progress_indeterminate
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn recipes(&self) -> &[RecipeItem] {
        &self.recipes
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Loading flag for the detection spinner.
    pub fn is_uploading(&self) -> bool {
        self.phase == Phase::Uploading
    }

    /// Loading flag for the recipe spinner.
    pub fn is_generating(&self) -> bool {
        self.phase == Phase::GeneratingRecipes
    }

    /// Starts a fresh session for a newly selected file.
    pub(crate) fn select(&mut self, file: VideoFile, preview: PreviewRef) {
        *self = Self {
            selected_file: Some(file),
            preview: Some(preview),
            ..Self::new()
        };
    }

    /// Moves to `Uploading` and hands back what the upload needs.
    ///
    /// Leaves the session untouched on error.
    pub(crate) fn begin_upload(&mut self) -> Result<(SessionId, VideoFile), WorkflowError> {
        let Some(file) = self.selected_file.clone() else {
            return Err(WorkflowError::no_file_selected());
        };
        if self.phase.is_in_flight() {
            return Err(WorkflowError::Busy);
        }
        if self.phase.is_terminal() {
            return Err(WorkflowError::SessionFinished);
        }
        self.phase = Phase::Uploading;
        self.ingredients.clear();
        self.progress_indeterminate = false;
        Ok((self.id, file))
    }

    /// Applies an upload progress report. Returns whether anything changed.
    ///
    /// The percentage never decreases; an unknown total only raises the
    /// indeterminate flag.
    pub(crate) fn record_progress(&mut self, progress: UploadProgress) -> bool {
        if self.phase != Phase::Uploading {
            return false;
        }
        match progress.percent() {
            Some(pct) if pct > self.upload_progress => {
                self.upload_progress = pct;
                self.progress_indeterminate = false;
                true
            }
            Some(_) => false,
            None if !self.progress_indeterminate => {
                self.progress_indeterminate = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn detected(&mut self, ingredients: Vec<Ingredient>) {
        self.ingredients = ingredients;
        self.progress_indeterminate = false;
        self.phase = Phase::Detected;
    }

    pub(crate) fn generating(&mut self) {
        self.phase = Phase::GeneratingRecipes;
    }

    pub(crate) fn complete(&mut self, recipes: Vec<RecipeItem>) {
        if self.ingredients.is_empty() {
            self.recipes.clear();
        } else {
            self.recipes = recipes;
        }
        self.phase = Phase::Complete;
    }

    pub(crate) fn fail(&mut self, stage: Stage) {
        if stage == Stage::Uploading {
            self.ingredients.clear();
        }
        self.recipes.clear();
        self.progress_indeterminate = false;
        self.phase = Phase::Failed(stage);
    }
}
