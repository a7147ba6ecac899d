//! Payment Model
//!
//! Read-side shape for the payment-status histogram.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub order: Option<RecordId>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub amount: f64,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
}
