//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
///
/// Products reference categories by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    /// Unique across all categories
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Categories seeded into an empty catalog
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "إكسسوارات الهواتف",
    "سماعات",
    "بطاريات",
    "كابلات",
    "شواحن",
    "حافظات",
    "شاشات حماية",
    "مكبرات صوت",
    "ذواكر",
    "أخرى",
];
