use serde::{Deserialize, Serialize};

/// Admin/info record backing the "More" screens (about us, FAQ, version).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InfoRecord {
    pub about_us: AboutUs,
    pub faq: Faq,
    pub version: Version,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AboutUs {
    pub title: String,
    pub content: String,
    pub footer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Faq {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Version {
    pub content: String,
}
