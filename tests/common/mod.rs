#![allow(dead_code)]

use async_trait::async_trait;
use catalog_admin::api::client::ProductApi;
use catalog_admin::api::error::{AppError, AppResult};
use catalog_admin::api::payload::SubmissionPayload;
use catalog_admin::models::{Category, Product, ProductType, Size};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
pub const PDF: &[u8] = b"%PDF-1.4\n%test";

/// In-memory product API that records every call.
#[derive(Default)]
pub struct MockProductApi {
    pub products: Mutex<Vec<Product>>,
    pub created: Mutex<Vec<SubmissionPayload>>,
    pub updated: Mutex<Vec<(String, SubmissionPayload)>>,
    pub deleted: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    pub reference_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_save: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_sizes: AtomicBool,
    /// When set, reference loads wait until notified.
    pub hold_references: AtomicBool,
    pub release: Notify,
}

impl MockProductApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        *api.products.lock().unwrap() = products;
        api
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }

    fn server_error() -> AppError {
        AppError::Api {
            status: 500,
            body: "boom".to_string(),
        }
    }

    async fn reference_gate(&self) {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_references.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl ProductApi for MockProductApi {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        Ok(self.products.lock().unwrap().clone())
    }

    async fn get_product(&self, id: &str) -> AppResult<Product> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    async fn create_product(&self, payload: SubmissionPayload) -> AppResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.created.lock().unwrap().push(payload);
        Ok(())
    }

    async fn update_product(&self, id: &str, payload: SubmissionPayload) -> AppResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.updated.lock().unwrap().push((id.to_string(), payload));
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> AppResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.deleted.lock().unwrap().push(id.to_string());
        self.products
            .lock()
            .unwrap()
            .retain(|p| p.id.as_deref() != Some(id));
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.reference_gate().await;
        Ok(vec![
            Category {
                id: "c1".to_string(),
                name: "Caixas".to_string(),
            },
            Category {
                id: "c2".to_string(),
                name: "Envelopes".to_string(),
            },
        ])
    }

    async fn list_types(&self) -> AppResult<Vec<ProductType>> {
        self.reference_gate().await;
        Ok(vec![ProductType {
            id: "t1".to_string(),
            name: "Corrugado".to_string(),
        }])
    }

    async fn list_sizes(&self) -> AppResult<Vec<Size>> {
        self.reference_gate().await;
        if self.fail_sizes.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        Ok(vec![Size {
            id: "s1".to_string(),
            value: "30x20".to_string(),
        }])
    }
}

pub fn persisted_product(id: &str, gallery: &[&str]) -> Product {
    Product {
        id: Some(id.to_string()),
        name: "Caixa Parda".to_string(),
        description: "Caixa de papelão".to_string(),
        specify: Some("Onda B".to_string()),
        category: Some(Category {
            id: "c1".to_string(),
            name: "Caixas".to_string(),
        }),
        product_type: Some(ProductType {
            id: "t1".to_string(),
            name: "Corrugado".to_string(),
        }),
        size: Some(Size {
            id: "s1".to_string(),
            value: "30x20".to_string(),
        }),
        gallery: gallery.iter().map(|url| url.to_string()).collect(),
        manual_url: Some("https://cdn.example.com/manual.pdf".to_string()),
        ..Default::default()
    }
}
