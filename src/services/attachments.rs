use crate::services::preview::{LocalFile, PreviewHandle, PreviewRegistry};
use std::fmt;
use uuid::Uuid;

/// Logical slot a pending file is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Manual,
    Project,
    /// One gallery image; the token keeps gallery entries distinct.
    Gallery(Uuid),
}

impl Slot {
    pub fn new_gallery() -> Self {
        Slot::Gallery(Uuid::new_v4())
    }

    /// Multipart field name. Every gallery slot shares `gallery`.
    pub fn field_name(&self) -> &'static str {
        match self {
            Slot::Manual => "manual",
            Slot::Project => "project",
            Slot::Gallery(_) => "gallery",
        }
    }

    pub fn is_gallery(&self) -> bool {
        matches!(self, Slot::Gallery(_))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Gallery(token) => write!(f, "gallery_{}", token.simple()),
            other => f.write_str(other.field_name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub slot: Slot,
    pub file: LocalFile,
    pub preview: PreviewHandle,
}

/// Pending local file selections for one form session.
///
/// Entries keep selection order so gallery parts are sent in the order the
/// operator added them. Every preview handle created here is revoked when
/// its entry is replaced or removed, on [`clear`](Self::clear) and on drop.
#[derive(Debug)]
pub struct AttachmentManager {
    registry: PreviewRegistry,
    entries: Vec<PendingAttachment>,
}

impl AttachmentManager {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            entries: Vec::new(),
        }
    }

    /// Attaches `file` to `slot`, replacing and releasing any previous
    /// selection for that slot.
    pub fn select(&mut self, slot: Slot, file: LocalFile) -> PreviewHandle {
        let preview = self.registry.create(&file);
        let entry = PendingAttachment {
            slot,
            file,
            preview: preview.clone(),
        };

        match self.entries.iter().position(|e| e.slot == slot) {
            Some(index) => {
                let old = std::mem::replace(&mut self.entries[index], entry);
                self.registry.revoke(&old.preview);
                tracing::debug!("Replaced pending attachment in slot {}", slot);
            }
            None => {
                self.entries.push(entry);
                tracing::debug!("Added pending attachment in slot {}", slot);
            }
        }
        preview
    }

    /// Drops the selection for `slot` and releases its preview.
    pub fn remove(&mut self, slot: Slot) -> bool {
        match self.entries.iter().position(|e| e.slot == slot) {
            Some(index) => {
                let removed = self.entries.remove(index);
                self.registry.revoke(&removed.preview);
                true
            }
            None => false,
        }
    }

    pub fn file(&self, slot: Slot) -> Option<&LocalFile> {
        self.entries.iter().find(|e| e.slot == slot).map(|e| &e.file)
    }

    pub fn preview(&self, slot: Slot) -> Option<&PreviewHandle> {
        self.entries
            .iter()
            .find(|e| e.slot == slot)
            .map(|e| &e.preview)
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.entries.iter().any(|e| e.slot == slot)
    }

    /// Pending attachments in selection order.
    pub fn entries(&self) -> &[PendingAttachment] {
        &self.entries
    }

    pub fn gallery_count(&self) -> usize {
        self.entries.iter().filter(|e| e.slot.is_gallery()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    /// Releases every pending attachment.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            self.registry.revoke(&entry.preview);
        }
    }
}

impl Drop for AttachmentManager {
    fn drop(&mut self) {
        self.clear();
    }
}
