//! Preview handles for the selected video.
//!
//! A preview is a scoped acquisition: [`PreviewLease`] owns the store entry
//! and releases it on drop, so replacing a selection or dropping the
//! workflow never leaks previews.
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use crate::model::VideoFile;

const OBJECT_URL_PREFIX: &str = "blob:pantry/";

/// Display reference to a selected video.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PreviewRef {
    pub id: uuid::Uuid,
    pub url: String,
}

/// Issues and revokes preview references.
pub trait PreviewStore: Send + Sync {
    fn acquire(&self, video: &VideoFile) -> PreviewRef;
    fn release(&self, preview: &PreviewRef);
}

/// Owned preview; releases its entry when dropped.
pub struct PreviewLease {
    preview: PreviewRef,
    store: Arc<dyn PreviewStore>,
}

impl PreviewLease {
    pub fn acquire(store: Arc<dyn PreviewStore>, video: &VideoFile) -> Self {
        let preview = store.acquire(video);
        Self { preview, store }
    }

    pub fn preview(&self) -> &PreviewRef {
        &self.preview
    }
}

impl Drop for PreviewLease {
    fn drop(&mut self) {
        self.store.release(&self.preview);
    }
}

/// In-process object URL registry (`blob:pantry/<uuid>` to video bytes).
#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    entries: DashMap<uuid::Uuid, Bytes>,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes behind a live object URL.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        let id = url.strip_prefix(OBJECT_URL_PREFIX)?;
        let id = uuid::Uuid::parse_str(id).ok()?;
        self.entries.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of live previews.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PreviewStore for ObjectUrlStore {
    fn acquire(&self, video: &VideoFile) -> PreviewRef {
        let id = uuid::Uuid::new_v4();
        self.entries.insert(id, video.bytes.clone());
        debug!(preview = %id, file = %video.file_name, "preview acquired");
        PreviewRef {
            id,
            url: format!("{OBJECT_URL_PREFIX}{id}"),
        }
    }

    fn release(&self, preview: &PreviewRef) {
        if self.entries.remove(&preview.id).is_some() {
            debug!(preview = %preview.id, "preview released");
        }
    }
}
