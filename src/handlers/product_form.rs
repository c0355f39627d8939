//! Create/edit form for a single product.
//!
//! The form is a small state machine: `Initial` until the category, type
//! and size lists have loaded, `Editing` while the operator works,
//! `Submitting` while the multipart request is in flight, and `Closed` once
//! the product was saved or the form was dismissed. A failed submission
//! drops back to `Editing` with every input kept.

use crate::api::client::ProductApi;
use crate::api::error::{AppError, AppResult, FieldErrors};
use crate::api::payload::SubmissionPayload;
use crate::models::{Product, ReferenceOption};
use crate::services::attachments::{AttachmentManager, Slot};
use crate::services::gallery::GalleryManager;
use crate::services::notifier::Notifier;
use crate::services::preview::{LocalFile, Preview, PreviewHandle, PreviewRegistry};
use crate::utils::validation::validate_document;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use validator::Validate;

/// Id of the "nothing selected" option offered in create mode.
pub const UNSELECTED_ID: &str = "";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormValues {
    pub name: String,
    #[validate(length(max = 100, message = "Description cannot exceed 100 characters."))]
    pub description: String,
    #[validate(length(max = 2000, message = "Specification cannot exceed 2000 characters."))]
    pub specify: Option<String>,
    pub category_id: Option<String>,
    pub type_id: Option<String>,
    pub size_id: Option<String>,
}

impl ProductFormValues {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            specify: product.specify.clone(),
            category_id: product.effective_category_id(),
            type_id: product.effective_type_id(),
            size_id: product.effective_size_id(),
        }
    }

    /// Inline messages for every invalid field, keyed by wire name.
    pub fn validate_fields(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required.");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Description is required.");
        }
        if self.category_id.is_none() {
            errors.add("categoryId", "Category is required.");
        }

        if let Err(report) = Validate::validate(self) {
            for (field, field_errors) in report.field_errors() {
                for e in field_errors.iter() {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    errors.add(field.to_string(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Non-empty scalar fields under their wire names.
    pub fn scalar_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
        ];
        let optional = [
            ("specify", &self.specify),
            ("categoryId", &self.category_id),
            ("typeId", &self.type_id),
            ("sizeId", &self.size_id),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name, value.as_str()));
            }
        }
        fields.retain(|(_, value)| !value.trim().is_empty());
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    Category,
    Type,
    Size,
}

impl ReferenceField {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ReferenceField::Category => "categoryId",
            ReferenceField::Type => "typeId",
            ReferenceField::Size => "sizeId",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReferenceField::Category => "Category",
            ReferenceField::Type => "Type",
            ReferenceField::Size => "Size",
        }
    }
}

/// Options and selection of one reference picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectField {
    pub label: &'static str,
    pub required: bool,
    pub options: Vec<ReferenceOption>,
    pub selected: Option<String>,
}

impl SelectField {
    fn new(field: ReferenceField, with_sentinel: bool, loaded: Vec<ReferenceOption>) -> Self {
        let mut options = Vec::with_capacity(loaded.len() + 1);
        if with_sentinel {
            options.push(ReferenceOption {
                id: UNSELECTED_ID.to_string(),
                label: format!("Select {}", field.label()),
            });
        }
        options.extend(loaded);
        Self {
            label: field.label(),
            required: field == ReferenceField::Category,
            options,
            selected: None,
        }
    }

    pub fn selected_option(&self) -> Option<&ReferenceOption> {
        let id = self.selected.as_deref()?;
        self.options.iter().find(|o| o.id == id)
    }

    /// Options in display order: the current selection first, never the
    /// sentinel.
    pub fn display_options(&self) -> Vec<&ReferenceOption> {
        let selected = self.selected_option();
        selected
            .into_iter()
            .chain(
                self.options
                    .iter()
                    .filter(|o| o.id != UNSELECTED_ID && Some(*o) != selected),
            )
            .collect()
    }

    pub fn has_sentinel(&self) -> bool {
        self.options.first().is_some_and(|o| o.id == UNSELECTED_ID)
    }

    fn contains(&self, id: &str) -> bool {
        self.options.iter().any(|o| o.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Initial,
    Editing,
    Submitting,
    Closed,
}

pub struct ProductForm {
    api: Arc<dyn ProductApi>,
    notifier: Notifier,
    mode: FormMode,
    initial: Option<Product>,
    state: FormState,
    values: ProductFormValues,
    categories: SelectField,
    types: SelectField,
    sizes: SelectField,
    attachments: AttachmentManager,
    gallery: GalleryManager,
    manual_preview: Option<Preview>,
    project_preview: Option<Preview>,
    errors: FieldErrors,
    cancel: CancellationToken,
}

impl ProductForm {
    /// Opens a form; a persisted `initial` product puts it in edit mode.
    pub fn new(
        api: Arc<dyn ProductApi>,
        notifier: Notifier,
        registry: PreviewRegistry,
        gallery_limit: usize,
        initial: Option<Product>,
    ) -> Self {
        let mode = match initial.as_ref().and_then(|p| p.id.clone()) {
            Some(id) => FormMode::Edit { id },
            None => FormMode::Create,
        };
        tracing::info!("Opening product form in {:?} mode", mode);

        Self {
            api,
            notifier,
            mode,
            initial,
            state: FormState::Initial,
            values: ProductFormValues::default(),
            categories: SelectField::default(),
            types: SelectField::default(),
            sizes: SelectField::default(),
            attachments: AttachmentManager::new(registry),
            gallery: GalleryManager::new(gallery_limit),
            manual_preview: None,
            project_preview: None,
            errors: FieldErrors::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Loads the three reference lists concurrently, then seeds every field
    /// exactly once. Any failed list fails the whole load and leaves the
    /// form in `Initial` so the load can be retried.
    pub async fn load(&mut self) -> AppResult<()> {
        if self.state != FormState::Initial {
            return Ok(());
        }

        let api = Arc::clone(&self.api);
        let token = self.cancel.clone();
        let fetched = tokio::select! {
            _ = token.cancelled() => None,
            res = async {
                tokio::try_join!(api.list_categories(), api.list_types(), api.list_sizes())
            } => Some(res),
        };

        if token.is_cancelled() {
            tracing::info!("Product form closed while loading; discarding reference data");
            return Err(AppError::Cancelled);
        }

        match fetched {
            Some(Ok((categories, types, sizes))) => {
                self.seed(
                    categories.into_iter().map(Into::into).collect(),
                    types.into_iter().map(Into::into).collect(),
                    sizes.into_iter().map(Into::into).collect(),
                );
                self.state = FormState::Editing;
                Ok(())
            }
            Some(Err(e)) => {
                tracing::error!("Failed to load reference data: {}", e);
                self.notifier.error("Error loading categories, types and sizes");
                Err(e)
            }
            None => Err(AppError::Cancelled),
        }
    }

    fn seed(
        &mut self,
        categories: Vec<ReferenceOption>,
        types: Vec<ReferenceOption>,
        sizes: Vec<ReferenceOption>,
    ) {
        let with_sentinel = self.mode == FormMode::Create;
        self.categories = SelectField::new(ReferenceField::Category, with_sentinel, categories);
        self.types = SelectField::new(ReferenceField::Type, with_sentinel, types);
        self.sizes = SelectField::new(ReferenceField::Size, with_sentinel, sizes);

        let limit = self.gallery.limit();
        match &self.initial {
            Some(product) => {
                self.values = ProductFormValues::from_product(product);
                self.gallery = GalleryManager::for_product(product, limit);
                self.manual_preview = product.manual_url.clone().map(Preview::Remote);
                self.project_preview = product.project_url.clone().map(Preview::Remote);
            }
            None => {
                self.values = ProductFormValues::default();
                self.gallery = GalleryManager::new(limit);
                self.manual_preview = None;
                self.project_preview = None;
            }
        }

        self.categories.selected = self.values.category_id.clone();
        self.types.selected = self.values.type_id.clone();
        self.sizes.selected = self.values.size_id.clone();
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> AppResult<()> {
        self.ensure_state(FormState::Editing)?;
        self.values.name = name.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> AppResult<()> {
        self.ensure_state(FormState::Editing)?;
        self.values.description = description.into();
        Ok(())
    }

    pub fn set_specify(&mut self, specify: Option<String>) -> AppResult<()> {
        self.ensure_state(FormState::Editing)?;
        self.values.specify = specify;
        Ok(())
    }

    /// Selects `id` for one reference field; the sentinel id clears it.
    pub fn select_reference(&mut self, field: ReferenceField, id: &str) -> AppResult<()> {
        self.ensure_state(FormState::Editing)?;

        let select = match field {
            ReferenceField::Category => &mut self.categories,
            ReferenceField::Type => &mut self.types,
            ReferenceField::Size => &mut self.sizes,
        };

        let chosen = if id == UNSELECTED_ID {
            None
        } else if select.contains(id) {
            Some(id.to_string())
        } else {
            return Err(AppError::invalid_field(
                field.wire_name(),
                format!("Unknown {} '{}'", field.label().to_lowercase(), id),
            ));
        };

        select.selected = chosen.clone();
        match field {
            ReferenceField::Category => self.values.category_id = chosen,
            ReferenceField::Type => self.values.type_id = chosen,
            ReferenceField::Size => self.values.size_id = chosen,
        }
        Ok(())
    }

    /// Attaches a PDF to the manual or project slot.
    pub fn select_document(&mut self, slot: Slot, file: LocalFile) -> AppResult<PreviewHandle> {
        self.ensure_state(FormState::Editing)?;
        if slot.is_gallery() {
            return Err(AppError::invalid_field(
                "gallery",
                "Gallery images are added through the gallery",
            ));
        }
        validate_document(slot.field_name(), &file.content_type, &file.bytes)?;

        let handle = self.attachments.select(slot, file);
        *self.document_preview_mut(slot) = Some(Preview::Local(handle.clone()));
        Ok(handle)
    }

    /// Clears the manual or project preview and any pending file behind it.
    pub fn remove_document(&mut self, slot: Slot) -> AppResult<()> {
        self.ensure_state(FormState::Editing)?;
        if slot.is_gallery() {
            return Ok(());
        }
        self.attachments.remove(slot);
        *self.document_preview_mut(slot) = None;
        Ok(())
    }

    /// Adds gallery images; a rejected batch is reported as a notice.
    pub fn add_gallery_images(&mut self, files: Vec<LocalFile>) -> AppResult<()> {
        self.ensure_state(FormState::Editing)?;
        let result = self.gallery.add(&mut self.attachments, files);
        if let Err(e) = &result {
            match e {
                AppError::Capacity(message) => self.notifier.error(message.clone()),
                other => self.notifier.error(other.to_string()),
            }
        }
        result
    }

    /// Removes the gallery preview at `index`; `false` when nothing was
    /// removed.
    pub fn remove_gallery_image(&mut self, index: usize) -> AppResult<bool> {
        self.ensure_state(FormState::Editing)?;
        Ok(self.gallery.remove_at(&mut self.attachments, index))
    }

    fn document_preview_mut(&mut self, slot: Slot) -> &mut Option<Preview> {
        match slot {
            Slot::Project => &mut self.project_preview,
            _ => &mut self.manual_preview,
        }
    }

    pub fn build_payload(&self) -> SubmissionPayload {
        SubmissionPayload::build(&self.values.scalar_fields(), &self.attachments)
    }

    /// Validates, sends the multipart payload and reports the outcome.
    pub async fn submit(&mut self) -> AppResult<()> {
        if let Err(e) = self.ensure_state(FormState::Editing) {
            tracing::warn!("Refused product submit in {:?} state", self.state);
            self.notifier.error("Error saving product");
            return Err(e);
        }

        if let Err(errors) = self.values.validate_fields() {
            tracing::info!("Product form has invalid fields: {}", errors);
            self.errors = errors.clone();
            return Err(AppError::Validation(errors));
        }
        self.errors = FieldErrors::new();

        let payload = self.build_payload();
        self.state = FormState::Submitting;

        let result = match &self.mode {
            FormMode::Create => self.api.create_product(payload).await,
            FormMode::Edit { id } => self.api.update_product(id, payload).await,
        };

        match result {
            Ok(()) => {
                self.notifier.success("Product saved successfully!");
                self.release_pending();
                self.state = FormState::Closed;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to save product: {}", e);
                self.notifier.error("Error saving product");
                self.state = FormState::Editing;
                Err(e)
            }
        }
    }

    /// Dismisses the form: cancels an in-flight load and releases previews.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.release_pending();
        self.state = FormState::Closed;
    }

    fn release_pending(&mut self) {
        self.attachments.clear();
        self.gallery.clear_pending();
        for preview in [&mut self.manual_preview, &mut self.project_preview] {
            if preview.as_ref().is_some_and(Preview::is_local) {
                *preview = None;
            }
        }
    }

    fn ensure_state(&self, expected: FormState) -> AppResult<()> {
        if self.state == expected {
            return Ok(());
        }
        Err(match self.state {
            FormState::Initial => AppError::Internal("Form data is still loading".to_string()),
            FormState::Submitting => AppError::Internal("Form is being submitted".to_string()),
            FormState::Closed => AppError::Internal("Form is closed".to_string()),
            FormState::Editing => AppError::Internal("Form is already loaded".to_string()),
        })
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn values(&self) -> &ProductFormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn select_field(&self, field: ReferenceField) -> &SelectField {
        match field {
            ReferenceField::Category => &self.categories,
            ReferenceField::Type => &self.types,
            ReferenceField::Size => &self.sizes,
        }
    }

    pub fn gallery(&self) -> &GalleryManager {
        &self.gallery
    }

    pub fn gallery_previews(&self) -> Vec<Preview> {
        self.gallery.previews()
    }

    /// Whether the add-images control is offered.
    pub fn can_add_gallery_images(&self) -> bool {
        self.state == FormState::Editing && self.gallery.can_add()
    }

    pub fn manual_preview(&self) -> Option<&Preview> {
        self.manual_preview.as_ref()
    }

    pub fn project_preview(&self) -> Option<&Preview> {
        self.project_preview.as_ref()
    }

    pub fn attachments(&self) -> &AttachmentManager {
        &self.attachments
    }

    /// Token cancelled when the form closes; hand it to anything that must
    /// stop once the form is gone.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for ProductForm {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
