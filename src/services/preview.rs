//! Session-local files and the preview handles that stand in for them.
//!
//! A preview handle is the client-side analogue of an object URL: a cheap
//! `blob:` reference to bytes that only live in this process. Handles must be
//! revoked once the preview is replaced, removed or the form closes.

use crate::api::error::AppResult;
use crate::utils::validation::{detect_content_type, sanitize_filename};
use bytes::Bytes;
use dashmap::DashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const PREVIEW_SCHEME: &str = "blob:catalog-admin/";

/// A file picked by the operator, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl LocalFile {
    pub fn new(file_name: &str, bytes: impl Into<Bytes>) -> AppResult<Self> {
        let bytes = bytes.into();
        let file_name = sanitize_filename(file_name)?;
        let content_type = detect_content_type(&file_name, &bytes);
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Self::new(name, data)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Opaque reference to a locally previewed file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    id: Uuid,
}

impl PreviewHandle {
    pub fn url(&self) -> String {
        format!("{}{}", PREVIEW_SCHEME, self.id)
    }

    pub fn parse(url: &str) -> Option<Self> {
        let raw = url.strip_prefix(PREVIEW_SCHEME)?;
        Uuid::parse_str(raw).ok().map(|id| Self { id })
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREVIEW_SCHEME, self.id)
    }
}

/// What a preview slot shows: either a local unsaved file or a URL the
/// server already persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Local(PreviewHandle),
    Remote(String),
}

impl Preview {
    pub fn url(&self) -> String {
        match self {
            Preview::Local(handle) => handle.url(),
            Preview::Remote(url) => url.clone(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Preview::Local(_))
    }
}

/// Shared store of preview contents, keyed by handle.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<DashMap<Uuid, LocalFile>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, file: &LocalFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.entries.insert(id, file.clone());
        tracing::debug!("Preview created: {}{} ({})", PREVIEW_SCHEME, id, file.file_name);
        PreviewHandle { id }
    }

    pub fn resolve(&self, handle: &PreviewHandle) -> Option<LocalFile> {
        self.entries.get(&handle.id).map(|entry| entry.value().clone())
    }

    /// Releases the bytes behind `handle`. Revoking twice is a no-op.
    pub fn revoke(&self, handle: &PreviewHandle) -> bool {
        let removed = self.entries.remove(&handle.id).is_some();
        if removed {
            tracing::debug!("Preview revoked: {}", handle);
        }
        removed
    }

    /// Number of handles that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}
