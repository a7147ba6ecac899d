//! Order Model
//!
//! Read-side shape consumed by the reporting aggregations; order placement
//! itself lives outside this core.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// A single purchased line inside an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub product: Option<RecordId>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: f64,
    /// Top-level category of the product at purchase time
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub parent_category: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user: Option<RecordId>,
    #[serde(default)]
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub status: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
}
