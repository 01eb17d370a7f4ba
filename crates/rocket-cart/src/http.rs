//! # HTTP API Client
//!
//! One `reqwest` client implementing both remote services against the
//! storefront API.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────────┐
//! │ GET {base}/stock/{id}    │ {"amount": 3}  (other fields ignored)        │
//! │ GET {base}/products/{id} │ {"id": 1, "title": "...", "price": 179.9,    │
//! │                          │  "image": "https://..."}                     │
//! └──────────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! A non-2xx status, an unreachable server, or a body of the wrong shape are
//! all errors; none are retried.

use async_trait::async_trait;
use reqwest::Client;
use rocket_core::{Product, ProductId, Stock};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ServiceError, ServiceResult};
use crate::services::{ProductCatalog, StockService};

/// Stock and catalog client for the storefront API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Creates a client for `base_url`.
    ///
    /// `timeout` bounds each request end to end; `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ServiceResult<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ServiceError::Client(e.to_string()))?;

        Ok(HttpApi { client, base_url })
    }

    fn endpoint(&self, path: &str) -> ServiceResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let url = self.endpoint(path)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ServiceError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| ServiceError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        decode(&url, &body)
    }
}

#[async_trait]
impl StockService for HttpApi {
    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn stock(&self, product_id: ProductId) -> ServiceResult<Stock> {
        let payload: StockPayload = self.get_json(&format!("stock/{}", product_id)).await?;
        debug!(available = payload.amount, "Fetched stock");
        Ok(Stock {
            id: product_id,
            amount: payload.amount,
        })
    }
}

/// Body of `GET /stock/{id}`. Only the amount is read; the record is keyed
/// by the id that was requested.
#[derive(Debug, Deserialize)]
struct StockPayload {
    amount: i64,
}

#[async_trait]
impl ProductCatalog for HttpApi {
    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn product(&self, product_id: ProductId) -> ServiceResult<Product> {
        let product: Product = self.get_json(&format!("products/{}", product_id)).await?;

        if product.id != product_id {
            return Err(ServiceError::UnexpectedProduct {
                requested: product_id,
                returned: product.id,
            });
        }

        debug!(title = %product.title, "Fetched product");
        Ok(product)
    }
}

/// Parses the API root, keeping a trailing slash so relative endpoints
/// extend the path instead of replacing its last segment.
fn parse_base_url(raw: &str) -> ServiceResult<Url> {
    let mut url = Url::parse(raw).map_err(|e| ServiceError::InvalidUrl(format!("{raw}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ServiceError::InvalidUrl(format!(
            "{raw}: scheme must be http or https"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn decode<T: DeserializeOwned>(url: &Url, body: &[u8]) -> ServiceResult<T> {
    serde_json::from_slice(body).map_err(|e| ServiceError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
