use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product category. Free-form strings are validated into this enum at every
/// boundary (persisted preferences, remote records, CLI input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mask,
    Sanitizer,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Mask, Category::Sanitizer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mask => "mask",
            Category::Sanitizer => "sanitizer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mask" => Ok(Category::Mask),
            "sanitizer" => Ok(Category::Sanitizer),
            _ => Err(CategoryError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid category '{0}'. Valid options: mask, sanitizer")]
pub struct CategoryError(pub String);

/// Reads an optional category from a remote record, mapping unknown or empty
/// values to `None` instead of failing the whole collection.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
