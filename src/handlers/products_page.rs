//! The products screen: the product table with an optional side form.

use crate::api::client::ProductApi;
use crate::api::error::{AppError, AppResult};
use crate::handlers::product_form::ProductForm;
use crate::handlers::product_list::ProductList;
use crate::services::notifier::Notifier;
use crate::services::preview::PreviewRegistry;
use std::sync::Arc;

pub struct ProductsPage {
    api: Arc<dyn ProductApi>,
    notifier: Notifier,
    previews: PreviewRegistry,
    gallery_limit: usize,
    list: ProductList,
    form: Option<ProductForm>,
}

impl ProductsPage {
    pub fn new(
        api: Arc<dyn ProductApi>,
        notifier: Notifier,
        previews: PreviewRegistry,
        gallery_limit: usize,
    ) -> Self {
        let list = ProductList::new(Arc::clone(&api), notifier.clone());
        Self {
            api,
            notifier,
            previews,
            gallery_limit,
            list,
            form: None,
        }
    }

    /// First render: fetch the table.
    pub async fn mount(&mut self) -> AppResult<()> {
        self.list.refresh().await
    }

    /// Opens an empty create form, replacing any open form.
    pub async fn open_add(&mut self) -> AppResult<()> {
        self.close_form();
        let form = self.form.insert(ProductForm::new(
            Arc::clone(&self.api),
            self.notifier.clone(),
            self.previews.clone(),
            self.gallery_limit,
            None,
        ));
        form.load().await
    }

    /// Fetches the product and opens it in an edit form. If the fetch fails
    /// no form is opened.
    pub async fn open_edit(&mut self, id: &str) -> AppResult<()> {
        self.close_form();
        let product = match self.api.get_product(id).await {
            Ok(product) => product,
            Err(e) => {
                tracing::error!("Failed to fetch product {}: {}", id, e);
                self.notifier.error("Error fetching product data");
                return Err(e);
            }
        };

        let form = self.form.insert(ProductForm::new(
            Arc::clone(&self.api),
            self.notifier.clone(),
            self.previews.clone(),
            self.gallery_limit,
            Some(product),
        ));
        form.load().await
    }

    /// Dismisses the open form, if any, releasing its previews.
    pub fn close_form(&mut self) {
        if let Some(mut form) = self.form.take() {
            form.close();
        }
    }

    /// Submits the open form. On success the form closes and the list is
    /// refreshed once; on failure the form stays open with its input.
    pub async fn submit_form(&mut self) -> AppResult<()> {
        let Some(form) = self.form.as_mut() else {
            tracing::warn!("submit_form called with no open form");
            self.notifier.error("No product form is open");
            return Err(AppError::Internal("No product form is open".to_string()));
        };
        form.submit().await?;

        self.close_form();
        if let Err(e) = self.list.refresh().await {
            tracing::warn!("Product saved but list refresh failed: {}", e);
        }
        Ok(())
    }

    pub fn list(&self) -> &ProductList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ProductList {
        &mut self.list
    }

    pub fn form(&self) -> Option<&ProductForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ProductForm> {
        self.form.as_mut()
    }

    pub fn is_form_open(&self) -> bool {
        self.form.is_some()
    }
}
