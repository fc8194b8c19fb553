use serde::{Deserialize, Serialize};

use super::product::Product;

/// Comparison record for one product.
///
/// `comparison_list` is `None` when the record carries no list at all, and
/// `Some(vec![])` once the product has entered the comparison flow without any
/// live comparison yet. The record views use that difference as a
/// discriminant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductComparison {
    pub product_id: String,
    // The remote source spells the field `comparionsList`.
    #[serde(default, rename = "comparisonList", alias = "comparionsList")]
    pub comparison_list: Option<Vec<Product>>,
}

impl ProductComparison {
    pub fn new(product_id: impl Into<String>, comparison_list: Vec<Product>) -> Self {
        Self {
            product_id: product_id.into(),
            comparison_list: Some(comparison_list),
        }
    }

    /// True once the product has entered the comparison flow.
    pub fn is_tracked(&self) -> bool {
        self.comparison_list.is_some()
    }

    /// True when at least one live comparison exists.
    pub fn is_active(&self) -> bool {
        self.comparison_list
            .as_ref()
            .is_some_and(|list| !list.is_empty())
    }
}
