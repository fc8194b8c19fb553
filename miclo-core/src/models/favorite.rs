use serde::{Deserialize, Serialize};

/// Marks a product as favorited. Sourced separately from the product
/// collection, so it may briefly disagree with a stale product record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteMarker {
    pub product_id: String,
}

impl FavoriteMarker {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
        }
    }
}
