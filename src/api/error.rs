use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", joined.join("; "))
    }
}

/// The four user-facing error families, plus local faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Capacity,
    Network,
    Auth,
    Local,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        AppError::Validation(errors)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Capacity(_) => ErrorKind::Capacity,
            AppError::Network(_)
            | AppError::Api { .. }
            | AppError::NotFound(_)
            | AppError::Cancelled => ErrorKind::Network,
            AppError::Unauthorized(_) => ErrorKind::Auth,
            AppError::Io(_) | AppError::Config(_) | AppError::Internal(_) => ErrorKind::Local,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(e: url::ParseError) -> Self {
        AppError::Config(format!("invalid API URL: {}", e))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name is required.");
        errors.add("name", "second");
        errors.add("description", "Description is required.");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Name is required."));
        assert_eq!(
            errors.to_string(),
            "description: Description is required.; name: Name is required."
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            AppError::invalid_field("name", "x").kind(),
            ErrorKind::Validation
        );
        assert_eq!(AppError::Capacity("full".into()).kind(), ErrorKind::Capacity);
        assert_eq!(
            AppError::Api {
                status: 500,
                body: String::new()
            }
            .kind(),
            ErrorKind::Network
        );
        assert_eq!(AppError::Unauthorized("no".into()).kind(), ErrorKind::Auth);
        assert_eq!(AppError::Config("bad".into()).kind(), ErrorKind::Local);
    }
}
