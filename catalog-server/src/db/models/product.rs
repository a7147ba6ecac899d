//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Catalog item
///
/// Every field is default-tolerant so rows fetched under a narrowed field
/// projection still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Owner reference
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user_id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    /// Unique across all products; derived from name when absent.
    /// Uniqueness is the storage layer's concern, not enforced here.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    /// Derived flash-sale price. Never persisted by the overlay engine;
    /// always serialized so callers can tell "no discount" (null) from
    /// "field absent".
    #[serde(default)]
    pub offer_price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub parent_category: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub sub_category: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub third_sub_category: Option<RecordId>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub rating_count: i64,
    /// Free-form specification map
    #[serde(default)]
    pub specification: serde_json::Value,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    /// Derived from name when absent
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Product description is required"))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub stock: i64,
    pub weight: Option<f64>,
    /// "category:id" references, all three levels required
    pub parent_category: String,
    pub sub_category: String,
    pub third_sub_category: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[validate(length(min = 1, message = "Brand of product is required"))]
    pub brand: String,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default)]
    pub specification: serde_json::Value,
    #[serde(default)]
    pub key_features: Vec<String>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub weight: Option<f64>,
    pub parent_category: Option<String>,
    pub sub_category: Option<String>,
    pub third_sub_category: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub brand: Option<String>,
    pub available_colors: Option<Vec<String>>,
    pub specification: Option<serde_json::Value>,
    pub key_features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
