//! Remote data source seam.
//!
//! The core only consumes "collection of raw records" per endpoint and
//! produces "one submission payload". Transport, auth and schema validation
//! belong to the [`RemoteSource`] implementation.

mod error;
mod http;
mod normalize;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::submit::ProductSubmission;

pub use error::{FetchError, SubmissionError};
pub use http::HttpRemote;
pub use normalize::{normalize_comparison, normalize_record};

/// Read endpoints of the remote data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Products,
    Comparisons,
    Favorites,
    Info,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Products => "products",
            Endpoint::Comparisons => "comparisons",
            Endpoint::Favorites => "favorites",
            Endpoint::Info => "info",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path of each endpoint relative to the server URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub products: String,
    pub comparisons: String,
    pub favorites: String,
    pub info: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            products: "/products".to_string(),
            comparisons: "/product-comparisons".to_string(),
            favorites: "/favorites".to_string(),
            info: "/admin".to_string(),
        }
    }
}

impl Endpoints {
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Products => &self.products,
            Endpoint::Comparisons => &self.comparisons,
            Endpoint::Favorites => &self.favorites,
            Endpoint::Info => &self.info,
        }
    }
}

/// Source of remote collections and sink for product submissions.
///
/// Each call is a single attempt; there is no retry policy at this layer.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches the raw records of one collection. A `null` body is an empty
    /// collection.
    async fn fetch_records(&self, endpoint: Endpoint) -> Result<Vec<Value>, FetchError>;

    /// Creates (`product_id == None`) or updates a product and returns the
    /// stored raw record.
    async fn submit_product(
        &self,
        product_id: Option<&str>,
        submission: &ProductSubmission,
    ) -> Result<Value, SubmissionError>;
}
