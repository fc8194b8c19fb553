use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{self, Category};
use super::lenient;

/// A scanned or submitted product as served by the remote data source.
///
/// Identity is `id`. Records are created by submission and replaced by
/// re-submission under the same id; they are never deleted locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub brand_name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub origin: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub remarks: String,
    #[serde(default, deserialize_with = "category::deserialize_lenient")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: f64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub favorite: bool,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_brand_name(mut self, brand_name: impl Into<String>) -> Self {
        self.brand_name = brand_name.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;
        writeln!(f, "ID: {}", self.id)?;

        if !self.brand_name.is_empty() {
            writeln!(f, "Brand: {}", self.brand_name)?;
        }
        if let Some(category) = self.category {
            writeln!(f, "Category: {}", category)?;
        }
        writeln!(f, "Price: ${:.0}", self.price)?;
        if !self.origin.is_empty() {
            writeln!(f, "Origin: {}", self.origin)?;
        }
        writeln!(f, "Rating: {:.1}/5", self.rating)?;
        if !self.labels.is_empty() {
            writeln!(f, "Labels: {}", self.labels.join(", "))?;
        }
        if !self.remarks.is_empty() {
            writeln!(f, "\nRemarks:\n{}", self.remarks)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_deserializes_camel_case() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "N95",
            "brandName": "3M",
            "price": 120,
            "origin": "US",
            "remarks": "",
            "category": "mask",
            "labels": ["kids"],
            "rating": 4
        }))
        .unwrap();

        assert_eq!(product.brand_name, "3M");
        assert_eq!(product.price, 120.0);
        assert_eq!(product.category, Some(Category::Mask));
        assert_eq!(product.labels, vec!["kids".to_string()]);
        assert!(!product.favorite);
    }

    #[test]
    fn test_product_tolerates_null_and_string_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": "p2",
            "name": "Gel",
            "brandName": null,
            "price": "35.5",
            "origin": 42,
            "remarks": null,
            "labels": null,
            "rating": "n/a",
            "favorite": null
        }))
        .unwrap();

        assert_eq!(product.brand_name, "");
        assert_eq!(product.price, 35.5);
        assert_eq!(product.origin, "42");
        assert_eq!(product.remarks, "");
        assert!(product.labels.is_empty());
        assert_eq!(product.rating, 0.0);
        assert!(!product.favorite);
    }

    #[test]
    fn test_product_unknown_category_is_none() {
        let product: Product =
            serde_json::from_value(json!({ "id": "p1", "category": "Gloves" })).unwrap();
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_product_missing_id_fails() {
        let result: Result<Product, _> = serde_json::from_value(json!({ "name": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_product_display() {
        let product = Product::new("p1", "Gel")
            .with_category(Category::Sanitizer)
            .with_labels(vec!["travel".into()]);
        let output = format!("{}", product);
        assert!(output.contains("Gel"));
        assert!(output.contains("Category: sanitizer"));
        assert!(output.contains("Labels: travel"));
    }
}
