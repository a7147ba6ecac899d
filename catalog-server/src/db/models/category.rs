//! Category Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Category node in the rooted forest
///
/// `slug` is the dash-joined path of every ancestor's own slug plus this
/// node's own, computed once at creation. Renaming a parent does not
/// retroactively rewrite descendant slugs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// None for roots
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub parent: Option<RecordId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub created_by: Option<RecordId>,
    /// Icon image path
    #[serde(default)]
    pub icon: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    /// "category:id" reference; None creates a root
    pub parent: Option<String>,
    pub description: Option<String>,
}

/// Update category payload
///
/// Slug is intentionally absent: it is not recomputed on rename.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Category with attached children, produced by tree reconstruction
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }
}
