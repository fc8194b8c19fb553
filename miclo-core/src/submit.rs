//! Product capture form state and the payload sent to the write endpoint.

use serde::Serialize;
use serde_json::Value;

use crate::models::{Category, Product};
use crate::remote::{normalize_record, SubmissionError};

/// Highest rating a product can be given.
pub const MAX_RATING: u8 = 5;

/// Editable product form. Built blank for a new capture or prefilled from an
/// existing product when editing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDraft {
    pub name: String,
    pub brand_name: String,
    pub price: f64,
    pub origin: String,
    pub remarks: String,
    pub category: Option<Category>,
    rating: u8,
    labels: Vec<String>,
}

impl ProductDraft {
    /// Blank draft preselecting the user's default category.
    pub fn new(default_category: Option<Category>) -> Self {
        Self {
            category: default_category,
            ..Self::default()
        }
    }

    /// Draft for editing `product`. Falls back to `default_category` when the
    /// product has none.
    pub fn from_product(product: &Product, default_category: Option<Category>) -> Self {
        let mut draft = Self {
            name: product.name.clone(),
            brand_name: product.brand_name.clone(),
            price: product.price,
            origin: product.origin.clone(),
            remarks: product.remarks.clone(),
            category: product.category.or(default_category),
            rating: product.rating.round().clamp(0.0, f64::from(MAX_RATING)) as u8,
            labels: Vec::with_capacity(product.labels.len()),
        };
        for label in &product.labels {
            draft.add_label(label);
        }
        draft
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn set_rating(&mut self, rating: u8) -> Result<(), SubmissionError> {
        if rating > MAX_RATING {
            return Err(SubmissionError::Invalid(format!(
                "rating must be between 0 and {}, got {}",
                MAX_RATING, rating
            )));
        }
        self.rating = rating;
        Ok(())
    }

    /// Adds a label unless it is blank or already present ignoring case.
    /// Returns whether the label was added.
    pub fn add_label(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() {
            return false;
        }

        let lower = label.to_lowercase();
        if self.labels.iter().any(|l| l.to_lowercase() == lower) {
            return false;
        }

        self.labels.push(label.to_string());
        true
    }

    /// Removes exact matches of `label`. Returns whether anything was removed.
    pub fn remove_label(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        self.labels.len() != before
    }

    /// Checks the draft can be submitted and returns its category.
    pub fn validate(&self) -> Result<Category, SubmissionError> {
        if self.name.trim().is_empty() {
            return Err(SubmissionError::Invalid("name is required".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(SubmissionError::Invalid(format!(
                "price must be a non-negative number, got {}",
                self.price
            )));
        }
        if self.rating > MAX_RATING {
            return Err(SubmissionError::Invalid(format!(
                "rating must be between 0 and {}",
                MAX_RATING
            )));
        }
        self.category
            .ok_or_else(|| SubmissionError::Invalid("category is required".to_string()))
    }

    /// Builds the payload for the write endpoint.
    pub fn into_submission(
        self,
        device_id: Option<String>,
    ) -> Result<ProductSubmission, SubmissionError> {
        let category = self.validate()?;

        Ok(ProductSubmission {
            name: self.name.trim().to_string(),
            brand_name: self.brand_name.trim().to_string(),
            price: self.price,
            origin: self.origin.trim().to_string(),
            remarks: self.remarks,
            rating: self.rating,
            category,
            labels: self.labels,
            device_id,
        })
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSubmission {
    pub name: String,
    pub brand_name: String,
    pub price: f64,
    pub origin: String,
    pub remarks: String,
    pub rating: u8,
    pub category: Category,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Decodes the record returned by the write endpoint.
pub fn parse_stored_product(raw: Value) -> Result<Product, SubmissionError> {
    let normalized = normalize_record(raw).map_err(SubmissionError::Decode)?;
    serde_json::from_value(normalized).map_err(|e| SubmissionError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled_draft() -> ProductDraft {
        let mut draft = ProductDraft::new(Some(Category::Mask));
        draft.name = "N95".to_string();
        draft.brand_name = "3M".to_string();
        draft.price = 120.0;
        draft
    }

    #[test]
    fn test_new_draft_uses_default_category() {
        let draft = ProductDraft::new(Some(Category::Sanitizer));
        assert_eq!(draft.category, Some(Category::Sanitizer));
        assert_eq!(draft.rating(), 0);
        assert!(draft.labels().is_empty());

        assert_eq!(ProductDraft::new(None).category, None);
    }

    #[test]
    fn test_from_product() {
        let product = Product::new("p1", "Gel")
            .with_brand_name("Purell")
            .with_rating(3.6)
            .with_labels(vec!["Kids".to_string(), "kids".to_string(), "travel".to_string()]);

        let draft = ProductDraft::from_product(&product, Some(Category::Sanitizer));
        assert_eq!(draft.name, "Gel");
        assert_eq!(draft.brand_name, "Purell");
        assert_eq!(draft.rating(), 4);
        assert_eq!(draft.category, Some(Category::Sanitizer));
        assert_eq!(draft.labels(), ["Kids", "travel"]);

        let masked = Product::new("p2", "N95").with_category(Category::Mask);
        let draft = ProductDraft::from_product(&masked, Some(Category::Sanitizer));
        assert_eq!(draft.category, Some(Category::Mask));
    }

    #[test]
    fn test_labels_unique_ignoring_case() {
        let mut draft = ProductDraft::default();
        assert!(draft.add_label("Kids"));
        assert!(!draft.add_label("KIDS"));
        assert!(!draft.add_label("  "));
        assert!(draft.add_label(" reusable "));
        assert_eq!(draft.labels(), ["Kids", "reusable"]);

        assert!(!draft.remove_label("kids"));
        assert!(draft.remove_label("Kids"));
        assert_eq!(draft.labels(), ["reusable"]);
    }

    #[test]
    fn test_rating_bounds() {
        let mut draft = ProductDraft::default();
        draft.set_rating(5).unwrap();
        assert_eq!(draft.rating(), 5);

        let err = draft.set_rating(6).unwrap_err();
        assert!(matches!(err, SubmissionError::Invalid(_)));
        assert_eq!(draft.rating(), 5);
    }

    #[test]
    fn test_validate() {
        assert_eq!(filled_draft().validate().unwrap(), Category::Mask);

        let mut unnamed = filled_draft();
        unnamed.name = "   ".to_string();
        assert!(unnamed.validate().is_err());

        let mut uncategorized = filled_draft();
        uncategorized.category = None;
        assert!(uncategorized.validate().is_err());

        let mut negative = filled_draft();
        negative.price = -1.0;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_submission_payload() {
        let mut draft = filled_draft();
        draft.add_label("kids");
        draft.set_rating(4).unwrap();

        let body = serde_json::to_value(draft.clone().into_submission(Some("dev-1".into())).unwrap())
            .unwrap();
        assert_eq!(body["brandName"], json!("3M"));
        assert_eq!(body["category"], json!("mask"));
        assert_eq!(body["rating"], json!(4));
        assert_eq!(body["labels"], json!(["kids"]));
        assert_eq!(body["deviceId"], json!("dev-1"));

        let anonymous = serde_json::to_value(draft.into_submission(None).unwrap()).unwrap();
        assert!(anonymous.get("deviceId").is_none());
    }

    #[test]
    fn test_parse_stored_product() {
        let product = parse_stored_product(json!({
            "_id": "abc",
            "__v": 0,
            "name": "N95",
            "category": "mask",
            "rating": 4
        }))
        .unwrap();
        assert_eq!(product.id, "abc");
        assert_eq!(product.category, Some(Category::Mask));
        assert_eq!(product.rating, 4.0);

        assert!(matches!(
            parse_stored_product(json!("not an object")),
            Err(SubmissionError::Decode(_))
        ));
    }
}
