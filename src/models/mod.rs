use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: String,
    pub name: String,
}

/// Sizes carry their display label in `value`, not `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: String,
    pub value: String,
}

/// A catalog product as returned by the product API.
///
/// `id` is absent until the product has been persisted. Once it is present
/// the gallery is read-only from this client's side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specify: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_id: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Category id, preferring the flat reference over the embedded entity.
    pub fn effective_category_id(&self) -> Option<String> {
        self.category_id
            .clone()
            .or_else(|| self.category.as_ref().map(|c| c.id.clone()))
    }

    pub fn effective_type_id(&self) -> Option<String> {
        self.type_id
            .clone()
            .or_else(|| self.product_type.as_ref().map(|t| t.id.clone()))
    }

    pub fn effective_size_id(&self) -> Option<String> {
        self.size_id
            .clone()
            .or_else(|| self.size.as_ref().map(|s| s.id.clone()))
    }

    pub fn category_label(&self) -> &str {
        self.category.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }

    pub fn type_label(&self) -> &str {
        self.product_type
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    pub fn size_label(&self) -> &str {
        self.size.as_ref().map(|s| s.value.as_str()).unwrap_or("")
    }
}

/// A selectable `{id, label}` pair for the category, type and size pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceOption {
    pub id: String,
    pub label: String,
}

impl From<Category> for ReferenceOption {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            label: c.name,
        }
    }
}

impl From<ProductType> for ReferenceOption {
    fn from(t: ProductType) -> Self {
        Self {
            id: t.id,
            label: t.name,
        }
    }
}

impl From<Size> for ReferenceOption {
    fn from(s: Size) -> Self {
        Self {
            id: s.id,
            label: s.value,
        }
    }
}

/// Cuts `label` to `max` characters and appends `...` when it was longer.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let head: String = label.chars().take(max).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}
