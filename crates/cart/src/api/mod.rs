//! Catalog HTTP API client.
//!
//! A thin `reqwest` client bound to a configured base URL. The catalog is
//! the source of products shown to the user; adding one to the cart goes
//! through [`crate::CartStore::add_to_cart`], which never talks to this
//! client.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartkeep::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api);
//! for product in client.list_products().await? {
//!     println!("{} {}", product.title, product.price);
//! }
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use cartkeep_core::NewLineItem;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for the catalog API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new catalog API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
            }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET a JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// List the products offered by the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<NewLineItem>, ApiError> {
        self.get_json("products").await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
