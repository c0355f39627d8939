use crate::api::client::ProductApi;
use crate::api::error::AppResult;
use crate::models::Product;
use crate::services::notifier::Notifier;
use std::sync::Arc;

/// Products whose name, type, size or category contains `query`,
/// ignoring case. Source order is kept and the source is not touched.
pub fn filter_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| matches_query(p, &needle))
        .collect()
}

fn matches_query(product: &Product, needle: &str) -> bool {
    [
        product.name.as_str(),
        product.type_label(),
        product.size_label(),
        product.category_label(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Product table state: the fetched list, the search box and the delete
/// confirmation gate.
pub struct ProductList {
    api: Arc<dyn ProductApi>,
    notifier: Notifier,
    products: Vec<Product>,
    loading: bool,
    last_error: Option<String>,
    query: String,
    pending_delete: Option<String>,
}

impl ProductList {
    pub fn new(api: Arc<dyn ProductApi>, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            products: Vec::new(),
            loading: true,
            last_error: None,
            query: String::new(),
            pending_delete: None,
        }
    }

    /// Refetches the whole list and replaces it. On failure the previous
    /// list stays, `last_error` is set and an error notice is published.
    pub async fn refresh(&mut self) -> AppResult<()> {
        self.loading = true;
        let result = self.api.list_products().await;
        self.loading = false;

        match result {
            Ok(products) => {
                tracing::info!("Loaded {} products", products.len());
                self.products = products;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load products: {}", e);
                self.notifier.error("Error loading products");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filter(&self, query: &str) -> Vec<&Product> {
        filter_products(&self.products, query)
    }

    /// Rows for the current search text.
    pub fn visible(&self) -> Vec<&Product> {
        self.filter(&self.query)
    }

    /// Opens the confirmation gate for `id`. Never deletes anything.
    pub fn request_delete(&mut self, id: impl Into<String>) {
        let id = id.into();
        tracing::debug!("Delete requested for product {}", id);
        self.pending_delete = Some(id);
    }

    /// Cancels the pending delete without side effects.
    pub fn close_confirm(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn is_confirm_open(&self) -> bool {
        self.pending_delete.is_some()
    }

    /// Deletes the pending product, then refreshes once. Without a pending
    /// target this does nothing.
    pub async fn confirm_delete(&mut self) -> AppResult<()> {
        let Some(id) = self.pending_delete.take() else {
            tracing::warn!("confirm_delete called with no pending product");
            return Ok(());
        };

        if let Err(e) = self.api.delete_product(&id).await {
            tracing::error!("Failed to delete product {}: {}", id, e);
            self.notifier.error("Error deleting product");
            return Err(e);
        }
        self.notifier.success("Product deleted");
        self.refresh().await
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
