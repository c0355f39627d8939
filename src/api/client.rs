//! REST client for the remote product API.
//!
//! Wraps `/products`, `/categories`, `/types` and `/sizes` using
//! [`reqwest`]. Product reads by id and every product write carry the
//! configured API key in the `key` header.

use crate::api::error::{AppError, AppResult};
use crate::api::payload::SubmissionPayload;
use crate::config::ClientConfig;
use crate::models::{Category, Product, ProductType, Size};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

const API_KEY_HEADER: &str = "key";

/// Operations the admin consumes from the product API.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn get_product(&self, id: &str) -> AppResult<Product>;

    async fn create_product(&self, payload: SubmissionPayload) -> AppResult<()>;

    async fn update_product(&self, id: &str, payload: SubmissionPayload) -> AppResult<()>;

    async fn delete_product(&self, id: &str) -> AppResult<()>;

    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn list_types(&self) -> AppResult<Vec<ProductType>>;

    async fn list_sizes(&self) -> AppResult<Vec<Size>>;
}

pub struct HttpProductApi {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpProductApi {
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Self::with_client(client, config)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.api_base_url)?;
        if config.api_key.is_none() {
            tracing::warn!("CATALOG_API_KEY is not set; protected product calls will be rejected");
        }
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn product_endpoint(&self, id: &str) -> AppResult<Url> {
        let mut url = self.endpoint("products")?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("API URL cannot be a base".to_string()))?
            .push(id);
        Ok(url)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = self.endpoint(path)?;
        tracing::info!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    async fn ensure_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::error!("Product API returned {}: {}", status, body);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(body));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::Api {
                status: status.as_u16(),
                body: format!("API key rejected: {}", body),
            });
        }
        Err(AppError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> AppResult<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductApi for HttpProductApi {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.get_json("products").await
    }

    async fn get_product(&self, id: &str) -> AppResult<Product> {
        let url = self.product_endpoint(id)?;
        tracing::info!("GET {}", url);
        let response = self.with_key(self.client.get(url)).send().await?;
        Self::parse_response(response).await
    }

    async fn create_product(&self, payload: SubmissionPayload) -> AppResult<()> {
        let url = self.endpoint("products")?;
        tracing::info!("POST {} ({} parts)", url, payload.len());
        let form = payload.into_form()?;
        let response = self
            .with_key(self.client.post(url))
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn update_product(&self, id: &str, payload: SubmissionPayload) -> AppResult<()> {
        let url = self.product_endpoint(id)?;
        tracing::info!("PUT {} ({} parts)", url, payload.len());
        let form = payload.into_form()?;
        let response = self
            .with_key(self.client.put(url))
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn delete_product(&self, id: &str) -> AppResult<()> {
        let url = self.product_endpoint(id)?;
        tracing::info!("DELETE {}", url);
        let response = self.with_key(self.client.delete(url)).send().await?;
        Self::check_status(response).await
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.get_json("categories").await
    }

    async fn list_types(&self) -> AppResult<Vec<ProductType>> {
        self.get_json("types").await
    }

    async fn list_sizes(&self) -> AppResult<Vec<Size>> {
        self.get_json("sizes").await
    }
}
