//! Raw listing parameters
//!
//! The request layer hands the core an untyped string-keyed bag (a parsed
//! query string). This type gives that bag static structure: every
//! recognized key is an explicit field; anything else lands in `extra` and
//! becomes a verbatim equality filter downstream.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A value that may arrive as a single string or a list of strings
/// (e.g. `?available_colors=Red&available_colors=Blue`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Normalize both shapes into a list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Client-supplied listing parameters, one instance per request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub search_term: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub fields: Option<String>,

    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_offer_price: Option<String>,
    pub max_offer_price: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
    pub min_stock: Option<String>,
    pub max_stock: Option<String>,

    pub brand: Option<String>,
    pub available_colors: Option<OneOrMany>,

    pub parent_category: Option<String>,
    pub sub_category: Option<String>,
    pub third_sub_category: Option<String>,

    /// Accepts `"true"` / `"false"` strings or a JSON boolean
    pub is_active: Option<serde_json::Value>,

    /// Unrecognized keys: passed through as direct equality filters
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ListParams {
    /// Page number, 1-based; invalid or absent input falls back to 1
    pub fn page_or_default(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    /// Page size; invalid or absent input falls back to 10.
    /// No upper bound is enforced: huge limits are the caller's problem.
    pub fn limit_or_default(&self) -> u32 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(10)
    }
}

/// Best-effort numeric coercion for range bounds.
/// Non-numeric input behaves as an absent bound, never an error.
pub(crate) fn parse_number(value: Option<&String>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}
