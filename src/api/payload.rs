//! Multipart submission payload for product create/update.
//!
//! Kept as an ordered list of parts so it can be inspected before it is
//! turned into a `reqwest` form at send time.

use crate::api::error::AppResult;
use crate::services::attachments::AttachmentManager;
use crate::services::preview::LocalFile;
use reqwest::multipart::{Form, Part};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Text(String),
    File(LocalFile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub name: String,
    pub body: PartBody,
}

impl PayloadPart {
    pub fn is_file(&self) -> bool {
        matches!(self.body, PartBody::File(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPayload {
    parts: Vec<PayloadPart>,
}

impl SubmissionPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scalar fields first (empty values skipped), then every pending
    /// attachment in selection order under its slot's field name.
    pub fn build(fields: &[(&str, &str)], attachments: &AttachmentManager) -> Self {
        let mut payload = Self::new();
        for &(name, value) in fields {
            payload.push_text(name, value);
        }
        for entry in attachments.entries() {
            payload.push_file(entry.slot.field_name(), entry.file.clone());
        }
        payload
    }

    /// Adds a text part; blank values are not sent.
    pub fn push_text(&mut self, name: &str, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        self.parts.push(PayloadPart {
            name: name.to_string(),
            body: PartBody::Text(value.to_string()),
        });
    }

    pub fn push_file(&mut self, name: &str, file: LocalFile) {
        self.parts.push(PayloadPart {
            name: name.to_string(),
            body: PartBody::File(file),
        });
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn text_parts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts.iter().filter_map(|p| match &p.body {
            PartBody::Text(value) => Some((p.name.as_str(), value.as_str())),
            PartBody::File(_) => None,
        })
    }

    pub fn file_parts(&self) -> impl Iterator<Item = (&str, &LocalFile)> {
        self.parts.iter().filter_map(|p| match &p.body {
            PartBody::File(file) => Some((p.name.as_str(), file)),
            PartBody::Text(_) => None,
        })
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.parts.iter().filter(|p| p.name == name).count()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn into_form(self) -> AppResult<Form> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part.body {
                PartBody::Text(value) => form.text(part.name, value),
                PartBody::File(file) => {
                    let body = Part::bytes(file.bytes.to_vec())
                        .file_name(file.file_name)
                        .mime_str(&file.content_type)?;
                    form.part(part.name, body)
                }
            };
        }
        Ok(form)
    }
}
