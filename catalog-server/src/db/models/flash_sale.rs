//! Flash Sale Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::Product;
use super::serde_helpers;

/// Promotional percentage-off record bound to exactly one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashSale {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub product: Option<RecordId>,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub created_by: Option<RecordId>,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
}

/// Create flash sale payload: one discount percentage over many products
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FlashSaleCreate {
    #[validate(length(min = 1, message = "At least one product is required"))]
    pub products: Vec<String>,
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub discount_percentage: f64,
}

/// Flash sale row with the product record fetched in place of the link.
/// `product` is None when the linked record no longer exists.
#[derive(Debug, Clone, Deserialize)]
pub struct FlashSaleWithProduct {
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub discount_percentage: f64,
}
