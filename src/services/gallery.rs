use crate::api::error::{AppError, AppResult};
use crate::config::MAX_GALLERY_IMAGES;
use crate::models::Product;
use crate::services::attachments::{AttachmentManager, Slot};
use crate::services::preview::{LocalFile, Preview, PreviewHandle};
use crate::utils::validation::validate_gallery_image;

/// One displayed gallery position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEntry {
    /// Image already stored on the server.
    Persisted(String),
    /// Unsaved image; `slot` is the attachment backing this exact preview.
    Pending { preview: PreviewHandle, slot: Slot },
}

/// Bounded, ordered gallery for one form session.
///
/// Display order and attachment correspondence live in the same vector, so
/// removing preview `i` always frees the attachment that produced it.
#[derive(Debug)]
pub struct GalleryManager {
    limit: usize,
    locked: bool,
    entries: Vec<GalleryEntry>,
}

impl GalleryManager {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_GALLERY_IMAGES),
            locked: false,
            entries: Vec::new(),
        }
    }

    /// Gallery seeded from an existing product. A persisted product locks the
    /// gallery: its URLs are shown read-only and nothing can be added.
    pub fn for_product(product: &Product, limit: usize) -> Self {
        let mut gallery = Self::new(limit);
        gallery.locked = product.is_persisted();
        gallery.entries = product
            .gallery
            .iter()
            .cloned()
            .map(GalleryEntry::Persisted)
            .collect();
        gallery
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether an "add images" control should be offered at all.
    pub fn can_add(&self) -> bool {
        !self.locked && self.entries.len() < self.limit
    }

    pub fn remaining(&self) -> usize {
        if self.locked {
            0
        } else {
            self.limit.saturating_sub(self.entries.len())
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    /// Adds all `files` or none of them.
    pub fn add(&mut self, attachments: &mut AttachmentManager, files: Vec<LocalFile>) -> AppResult<()> {
        if self.locked {
            tracing::warn!("Rejected gallery add on a persisted product");
            return Err(AppError::Capacity(
                "Gallery cannot be modified during update".to_string(),
            ));
        }

        if self.entries.len() + files.len() > self.limit {
            tracing::warn!(
                "Rejected gallery add: {} present, {} offered, limit {}",
                self.entries.len(),
                files.len(),
                self.limit
            );
            return Err(AppError::Capacity(format!(
                "Maximum {} gallery images allowed",
                self.limit
            )));
        }

        for file in &files {
            validate_gallery_image(&file.content_type, &file.bytes)?;
        }

        for file in files {
            let slot = Slot::new_gallery();
            let preview = attachments.select(slot, file);
            self.entries.push(GalleryEntry::Pending { preview, slot });
        }
        Ok(())
    }

    /// Removes the preview at `index` and frees its attachment.
    ///
    /// Returns `false` when the gallery is locked or `index` is out of range.
    pub fn remove_at(&mut self, attachments: &mut AttachmentManager, index: usize) -> bool {
        if self.locked || index >= self.entries.len() {
            tracing::warn!("Ignored gallery removal at index {}", index);
            return false;
        }

        if let GalleryEntry::Pending { slot, .. } = self.entries.remove(index) {
            attachments.remove(slot);
        }
        true
    }

    /// Drops every unsaved entry, keeping persisted URLs. Used once the
    /// backing attachments have been released.
    pub fn clear_pending(&mut self) {
        self.entries
            .retain(|entry| matches!(entry, GalleryEntry::Persisted(_)));
    }

    pub fn previews(&self) -> Vec<Preview> {
        self.entries
            .iter()
            .map(|entry| match entry {
                GalleryEntry::Persisted(url) => Preview::Remote(url.clone()),
                GalleryEntry::Pending { preview, .. } => Preview::Local(preview.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorKind;
    use crate::services::preview::PreviewRegistry;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn image(name: &str) -> LocalFile {
        LocalFile::new(name, PNG).unwrap()
    }

    fn images(n: usize) -> Vec<LocalFile> {
        (0..n).map(|i| image(&format!("img{}.png", i))).collect()
    }

    #[test]
    fn test_add_within_capacity() {
        let mut attachments = AttachmentManager::new(PreviewRegistry::new());
        let mut gallery = GalleryManager::new(3);

        gallery.add(&mut attachments, images(2)).unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.remaining(), 1);
        assert_eq!(attachments.gallery_count(), 2);
        assert!(gallery.can_add());
    }

    #[test]
    fn test_overflow_is_rejected_in_full() {
        let registry = PreviewRegistry::new();
        let mut attachments = AttachmentManager::new(registry.clone());
        let mut gallery = GalleryManager::new(3);
        gallery.add(&mut attachments, images(2)).unwrap();

        let err = gallery.add(&mut attachments, images(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert_eq!(gallery.len(), 2);
        assert_eq!(attachments.len(), 2);
        assert_eq!(registry.live_count(), 2);

        gallery.add(&mut attachments, images(1)).unwrap();
        assert!(!gallery.can_add());
        assert!(gallery.add(&mut attachments, images(1)).is_err());
        assert_eq!(gallery.len(), 3);
    }

    #[test]
    fn test_size_never_exceeds_limit() {
        let mut attachments = AttachmentManager::new(PreviewRegistry::new());
        let mut gallery = GalleryManager::new(3);
        for batch in [1usize, 3, 2, 1, 4, 1] {
            let _ = gallery.add(&mut attachments, images(batch));
            assert!(gallery.len() <= 3);
            assert_eq!(attachments.gallery_count(), gallery.len());
        }
    }

    #[test]
    fn test_non_image_rejects_whole_batch() {
        let mut attachments = AttachmentManager::new(PreviewRegistry::new());
        let mut gallery = GalleryManager::new(3);
        let pdf = LocalFile::new("manual.pdf", &b"%PDF-1.4"[..]).unwrap();

        let err = gallery
            .add(&mut attachments, vec![image("a.png"), pdf])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(gallery.is_empty());
        assert!(attachments.is_empty());
    }

    #[test]
    fn test_remove_at_frees_matching_attachment() {
        let registry = PreviewRegistry::new();
        let mut attachments = AttachmentManager::new(registry.clone());
        let mut gallery = GalleryManager::new(3);
        gallery
            .add(&mut attachments, vec![image("a.png"), image("b.png"), image("c.png")])
            .unwrap();

        assert!(gallery.remove_at(&mut attachments, 1));

        let remaining: Vec<String> = attachments
            .entries()
            .iter()
            .map(|e| e.file.file_name.clone())
            .collect();
        assert_eq!(remaining, vec!["a.png", "c.png"]);
        assert_eq!(registry.live_count(), 2);

        // Previews still line up with attachments after removal
        for (preview, entry) in gallery.previews().iter().zip(attachments.entries()) {
            assert_eq!(preview, &Preview::Local(entry.preview.clone()));
        }
        assert!(!gallery.remove_at(&mut attachments, 5));
    }

    #[test]
    fn test_persisted_product_locks_gallery() {
        let product = Product {
            id: Some("p1".to_string()),
            name: "Caixa".to_string(),
            gallery: vec!["https://cdn.example.com/1.png".to_string()],
            ..Default::default()
        };
        let mut attachments = AttachmentManager::new(PreviewRegistry::new());
        let mut gallery = GalleryManager::for_product(&product, 3);

        assert!(gallery.is_locked());
        assert!(!gallery.can_add());
        assert_eq!(gallery.remaining(), 0);
        assert_eq!(
            gallery.previews(),
            vec![Preview::Remote("https://cdn.example.com/1.png".to_string())]
        );

        let err = gallery.add(&mut attachments, images(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert!(!gallery.remove_at(&mut attachments, 0));
        assert_eq!(gallery.len(), 1);
        assert!(attachments.is_empty());
    }
}
