use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::{PantryBackend, ProgressSink, UploadProgress};
use crate::errors::WorkflowError;
use crate::model::{SessionId, Stage, VideoFile};
use crate::normalize::{decode_detections, decode_recipes, ingredient_names};
use crate::notify::{self, Notification, Notifier, TracingNotifier};
use crate::preview::{ObjectUrlStore, PreviewLease, PreviewStore};
use crate::session::Session;

/// Drives one selection → upload → recipe generation cycle at a time.
///
/// State lives in a `watch` channel: every transition is published to
/// subscribers, and no lock is held across a remote call. Each call captures
/// the session id it was issued for; if a new file was selected in the
/// meantime, its result is dropped and the call reports
/// [`WorkflowError::Superseded`].
pub struct UploadWorkflow {
    backend: Arc<dyn PantryBackend>,
    notifier: Arc<dyn Notifier>,
    previews: Arc<dyn PreviewStore>,
    state: Arc<watch::Sender<Session>>,
    lease: Mutex<Option<PreviewLease>>,
}

impl UploadWorkflow {
    /// Starts a builder for wiring the backend and collaborators.
    pub fn builder() -> UploadWorkflowBuilder {
        UploadWorkflowBuilder::default()
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Clone of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Selects a video, replacing (and abandoning) any previous session.
    ///
    /// No remote call is made. The previous preview is released after the new
    /// session is published.
    pub fn select_file(&self, file: VideoFile) -> SessionId {
        let lease = PreviewLease::acquire(self.previews.clone(), &file);
        let preview = lease.preview().clone();
        let file_name = file.file_name.clone();
        let mut session_id = SessionId::new();
        // The published preview and the held lease change under one lock.
        let previous = {
            let mut held = self.lease.lock().unwrap_or_else(PoisonError::into_inner);
            self.state.send_modify(|session| {
                session.select(file, preview);
                session_id = session.id();
            });
            held.replace(lease)
        };
        drop(previous);
        info!(session_id = %session_id, file = %file_name, "video selected");
        session_id
    }

    /// Uploads the selected video and, on success, generates recipes from the
    /// detected ingredients.
    ///
    /// Returns the final session. Errors are also reported through the
    /// notifier and leave the session in a stable phase.
    pub async fn submit(&self) -> Result<Session, WorkflowError> {
        let mut started = Err(WorkflowError::no_file_selected());
        let mut current = SessionId::new();
        self.state.send_if_modified(|session| {
            current = session.id();
            started = session.begin_upload();
            started.is_ok()
        });
        let (session_id, video) = match started {
            Ok(started) => started,
            Err(err) => {
                let message = match &err {
                    WorkflowError::Busy => notify::UPLOAD_BUSY,
                    WorkflowError::SessionFinished => notify::SESSION_FINISHED,
                    _ => notify::NO_FILE_SELECTED,
                };
                warn!(session_id = %current, error = %err, "submit rejected");
                self.notifier.notify(Notification::error(current, message));
                return Err(err);
            }
        };

        info!(
            session_id = %session_id,
            file = %video.file_name,
            bytes = video.len(),
            "upload started"
        );
        let result = self
            .backend
            .upload(&video, self.progress_sink(session_id))
            .await;
        let body = match result {
            Ok(body) => body,
            Err(err) => return Err(self.fail(session_id, Stage::Uploading, err.into())),
        };

        let detections = decode_detections(&body);
        if let Some(malformed) = &detections.malformed {
            warn!(session_id = %session_id, error = %malformed, "upload response normalized");
        }
        let ingredients = detections.value;
        let names = ingredient_names(&ingredients);
        let count = ingredients.len();
        if !self.apply(session_id, |session| session.detected(ingredients)) {
            return Err(self.superseded(session_id, Stage::Uploading));
        }
        info!(session_id = %session_id, ingredients = count, "ingredients detected");
        self.notifier
            .notify(Notification::success(session_id, notify::UPLOAD_SUCCEEDED));

        if names.is_empty() {
            self.apply(session_id, |session| session.complete(Vec::new()));
            self.notifier
                .notify(Notification::warning(session_id, notify::NO_INGREDIENTS));
            return Ok(self.snapshot());
        }
        self.generate_recipes(session_id, names).await
    }

    /// Second phase, entered only from a successful upload of the same
    /// session.
    async fn generate_recipes(
        &self,
        session_id: SessionId,
        names: Vec<String>,
    ) -> Result<Session, WorkflowError> {
        if !self.apply(session_id, |session| session.generating()) {
            return Err(self.superseded(session_id, Stage::GeneratingRecipes));
        }
        debug!(session_id = %session_id, ?names, "recipe generation started");

        let body = match self.backend.generate_recipes(&names).await {
            Ok(body) => body,
            Err(err) => {
                return Err(self.fail(session_id, Stage::GeneratingRecipes, err.into()));
            }
        };

        let recipes = decode_recipes(&body);
        let malformed = recipes.malformed;
        let count = recipes.value.len();
        if !self.apply(session_id, |session| session.complete(recipes.value)) {
            return Err(self.superseded(session_id, Stage::GeneratingRecipes));
        }
        if let Some(malformed) = malformed {
            warn!(session_id = %session_id, error = %malformed, "recipe response normalized");
            self.notifier
                .notify(Notification::warning(session_id, notify::RECIPES_MALFORMED));
        }
        info!(session_id = %session_id, recipes = count, "recipes generated");
        self.notifier
            .notify(Notification::success(session_id, notify::RECIPES_SUCCEEDED));
        Ok(self.snapshot())
    }

    /// Runs `f` on the session if it is still `session_id`.
    fn apply(&self, session_id: SessionId, f: impl FnOnce(&mut Session)) -> bool {
        self.state.send_if_modified(|session| {
            if session.id() != session_id {
                return false;
            }
            f(session);
            true
        })
    }

    fn fail(&self, session_id: SessionId, stage: Stage, err: WorkflowError) -> WorkflowError {
        if !self.apply(session_id, |session| session.fail(stage)) {
            return self.superseded(session_id, stage);
        }
        warn!(session_id = %session_id, ?stage, error = %err, "workflow stage failed");
        let message = match (&err, stage) {
            (WorkflowError::UploadStatus { .. }, _) => notify::UPLOAD_FAILED,
            (WorkflowError::GenerationStatus { .. }, _) => notify::RECIPES_FAILED,
            (_, Stage::Uploading) => notify::UPLOAD_ERRORED,
            (_, Stage::GeneratingRecipes) => notify::RECIPES_ERRORED,
        };
        self.notifier.notify(Notification::error(session_id, message));
        err
    }

    fn superseded(&self, session_id: SessionId, stage: Stage) -> WorkflowError {
        debug!(session_id = %session_id, ?stage, "dropping result for abandoned session");
        WorkflowError::Superseded
    }

    fn progress_sink(&self, session_id: SessionId) -> ProgressSink {
        let state = self.state.clone();
        Arc::new(move |progress: UploadProgress| {
            state.send_if_modified(|session| {
                session.id() == session_id && session.record_progress(progress)
            });
        })
    }
}

/// Builder used to wire collaborators before creating an `UploadWorkflow`.
#[derive(Default)]
pub struct UploadWorkflowBuilder {
    backend: Option<Arc<dyn PantryBackend>>,
    notifier: Option<Arc<dyn Notifier>>,
    previews: Option<Arc<dyn PreviewStore>>,
}

impl UploadWorkflowBuilder {
    /// Sets the backend. Required.
    pub fn backend(mut self, backend: Arc<dyn PantryBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the notification sink. Defaults to [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the preview store. Defaults to an in-memory [`ObjectUrlStore`].
    pub fn previews(mut self, previews: Arc<dyn PreviewStore>) -> Self {
        self.previews = Some(previews);
        self
    }

    pub fn build(self) -> Result<UploadWorkflow, WorkflowError> {
        let backend = self
            .backend
            .ok_or_else(|| WorkflowError::Config("a backend is required".into()))?;
        let (state, _) = watch::channel(Session::new());
        Ok(UploadWorkflow {
            backend,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            previews: self
                .previews
                .unwrap_or_else(|| Arc::new(ObjectUrlStore::new())),
            state: Arc::new(state),
            lease: Mutex::new(None),
        })
    }
}
