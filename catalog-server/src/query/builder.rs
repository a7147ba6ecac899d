//! Query builder
//!
//! Translates a [`ListParams`] bag into a SurrealQL SELECT with bound
//! parameters. Each stage narrows the result set; calling any subset of
//! stages in any order yields the same filters. Malformed input never
//! fails a stage, it degrades to a no-op or a default.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::PageMeta;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::params::{ListParams, parse_number};
use crate::utils::AppResult;

/// A bound query parameter: either a plain JSON value or a native record
/// link (so category filters compare as record ids, not strings).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum BindValue {
    Record(RecordId),
    Json(serde_json::Value),
}

/// Request-scoped query specification over one table
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    params: ListParams,
    conditions: Vec<String>,
    binds: Vec<(String, BindValue)>,
    order: Vec<String>,
    start: Option<u64>,
    limit: Option<u64>,
    projection: Option<String>,
    fetch: Vec<String>,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>, params: ListParams) -> Self {
        Self {
            table: table.into(),
            params,
            conditions: Vec::new(),
            binds: Vec::new(),
            order: Vec::new(),
            start: None,
            limit: None,
            projection: None,
            fetch: Vec::new(),
        }
    }

    fn push_bind(&mut self, value: BindValue) -> String {
        let name = format!("p{}", self.binds.len());
        self.binds.push((name.clone(), value));
        name
    }

    // =========================================================================
    // Filter stages
    // =========================================================================

    /// OR-combined case-insensitive substring match across `fields`.
    /// No search term: no-op.
    pub fn search(mut self, fields: &[&str]) -> Self {
        let term = match self.params.search_term.clone() {
            Some(t) if !t.trim().is_empty() => t.trim().to_lowercase(),
            _ => return self,
        };
        let param = self.push_bind(BindValue::Json(json!(term)));
        let parts: Vec<String> = fields
            .iter()
            .filter_map(|f| sanitize_key(f))
            .map(|f| format!("string::contains(string::lowercase({f}), ${param})"))
            .collect();
        if !parts.is_empty() {
            self.conditions.push(format!("({})", parts.join(" OR ")));
        }
        self
    }

    /// Pass-through equality for every unrecognized parameter key.
    ///
    /// Deliberately permissive: any query key outside the recognized set
    /// becomes a verbatim `field = value` constraint. Keys that are not
    /// plain identifiers are dropped.
    pub fn filter(mut self) -> Self {
        for (key, value) in self.params.extra.clone() {
            let Some(field) = sanitize_key(&key) else {
                tracing::debug!(key = %key, "Dropping non-identifier filter key");
                continue;
            };
            let param = self.push_bind(BindValue::Json(value));
            self.conditions.push(format!("{field} = ${param}"));
        }
        self
    }

    /// Equality per category level; absent levels impose no constraint.
    /// Values that do not parse as record ids behave as absent.
    pub fn filter_by_categories(mut self) -> Self {
        let levels = [
            ("parent_category", self.params.parent_category.clone()),
            ("sub_category", self.params.sub_category.clone()),
            ("third_sub_category", self.params.third_sub_category.clone()),
        ];
        for (field, value) in levels {
            let Some(id) = value.and_then(|v| v.parse::<RecordId>().ok()) else {
                continue;
            };
            let param = self.push_bind(BindValue::Record(id));
            self.conditions.push(format!("{field} = ${param}"));
        }
        self
    }

    /// Brand: anchored case-insensitive whole-string match.
    /// Colors: case-insensitive set intersection with the requested list.
    pub fn filter_by_brand_and_color(mut self) -> Self {
        if let Some(brand) = self.params.brand.clone()
            && !brand.is_empty()
        {
            let param = self.push_bind(BindValue::Json(json!(brand.to_lowercase())));
            self.conditions
                .push(format!("string::lowercase(brand) = ${param}"));
        }

        if let Some(colors) = self.params.available_colors.clone() {
            let colors: Vec<String> = colors
                .into_vec()
                .into_iter()
                .map(|c| c.to_lowercase())
                .collect();
            if !colors.is_empty() {
                let param = self.push_bind(BindValue::Json(json!(colors)));
                self.conditions.push(format!(
                    "array::map(available_colors, |$c| string::lowercase($c)) CONTAINSANY ${param}"
                ));
            }
        }
        self
    }

    /// Bounded range on a numeric field; either bound may be absent.
    fn numeric_range(mut self, field: &str, min: Option<f64>, max: Option<f64>) -> Self {
        if let Some(min) = min {
            let param = self.push_bind(BindValue::Json(json!(min)));
            self.conditions.push(format!("{field} >= ${param}"));
        }
        if let Some(max) = max {
            let param = self.push_bind(BindValue::Json(json!(max)));
            self.conditions.push(format!("{field} <= ${param}"));
        }
        self
    }

    pub fn price_range(self) -> Self {
        let min = parse_number(self.params.min_price.as_ref());
        let max = parse_number(self.params.max_price.as_ref());
        self.numeric_range("price", min, max)
    }

    pub fn offer_price_range(self) -> Self {
        let min = parse_number(self.params.min_offer_price.as_ref());
        let max = parse_number(self.params.max_offer_price.as_ref());
        self.numeric_range("offer_price", min, max)
    }

    pub fn rating_range(self) -> Self {
        let min = parse_number(self.params.min_rating.as_ref());
        let max = parse_number(self.params.max_rating.as_ref());
        self.numeric_range("average_rating", min, max)
    }

    pub fn stock_range(self) -> Self {
        let min = parse_number(self.params.min_stock.as_ref());
        let max = parse_number(self.params.max_stock.as_ref());
        self.numeric_range("stock", min, max)
    }

    /// Strict boolean equality on the active flag.
    /// Absent parameter: both active and inactive records are visible.
    pub fn is_active_filter(mut self) -> Self {
        let Some(active) = self.params.is_active.clone().and_then(parse_bool) else {
            return self;
        };
        let param = self.push_bind(BindValue::Json(json!(active)));
        self.conditions.push(format!("is_active = ${param}"));
        self
    }

    // =========================================================================
    // Shaping stages
    // =========================================================================

    /// Comma-separated sort keys, `-` prefix for descending.
    /// Default: newest first.
    pub fn sort(mut self) -> Self {
        let spec = self.params.sort.clone().unwrap_or_default();
        let mut keys: Vec<String> = Vec::new();
        for raw in spec.split(',') {
            let raw = raw.trim();
            let (field, dir) = match raw.strip_prefix('-') {
                Some(rest) => (rest, "DESC"),
                None => (raw, "ASC"),
            };
            if let Some(field) = sanitize_key(field) {
                keys.push(format!("{field} {dir}"));
            }
        }
        if keys.is_empty() {
            keys.push("created_at DESC".to_string());
        }
        self.order = keys;
        self
    }

    /// 1-indexed page / page-size pagination, start = (page-1)*limit
    pub fn paginate(mut self) -> Self {
        let page = self.params.page_or_default();
        let limit = self.params.limit_or_default();
        self.start = Some(u64::from(page - 1) * u64::from(limit));
        self.limit = Some(u64::from(limit));
        self
    }

    /// Comma-separated field inclusion projection; default selects all
    pub fn fields(mut self) -> Self {
        let spec = self.params.fields.clone().unwrap_or_default();
        let cols: Vec<String> = spec.split(',').filter_map(|f| sanitize_key(f)).collect();
        if !cols.is_empty() {
            self.projection = Some(cols.join(", "));
        }
        self
    }

    /// Hydrate a record link in place of its id on the way out
    pub fn fetch_link(mut self, field: &str) -> Self {
        if let Some(field) = sanitize_key(field) {
            self.fetch.push(field);
        }
        self
    }

    // =========================================================================
    // Rendering and execution
    // =========================================================================

    /// The composed SELECT statement
    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.projection.as_deref().unwrap_or("*"),
            self.table
        );
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(start) = self.start {
            sql.push_str(&format!(" START {start}"));
        }
        if !self.fetch.is_empty() {
            sql.push_str(" FETCH ");
            sql.push_str(&self.fetch.join(", "));
        }
        sql
    }

    /// Count statement over the accumulated filters only
    /// (sort, pagination and projection are ignored)
    pub fn count_sql(&self) -> String {
        let mut sql = format!("SELECT count() FROM {}", self.table);
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(" GROUP ALL");
        sql
    }

    /// Execute the composed query
    pub async fn run<T: DeserializeOwned>(&self, db: &Surreal<Db>) -> AppResult<Vec<T>> {
        let sql = self.to_sql();
        tracing::debug!(sql = %sql, "Executing list query");
        let mut query = db.query(sql);
        for (name, value) in &self.binds {
            query = query.bind((name.clone(), value.clone()));
        }
        let mut result = query.await?;
        Ok(result.take(0)?)
    }

    /// Count matching records and fold in page/limit into result metadata.
    /// Independent of whether the paginated fetch ran.
    pub async fn count_total(&self, db: &Surreal<Db>) -> AppResult<PageMeta> {
        let mut query = db.query(self.count_sql());
        for (name, value) in &self.binds {
            query = query.bind((name.clone(), value.clone()));
        }
        let mut result = query.await?;
        let total: Option<i64> = result.take((0, "count"))?;
        Ok(PageMeta::new(
            self.params.page_or_default(),
            self.params.limit_or_default(),
            total.unwrap_or(0).max(0) as u64,
        ))
    }
}

/// Restrict field/sort keys to plain identifiers; everything else is dropped
fn sanitize_key(key: &str) -> Option<String> {
    let key = key.trim();
    let mut chars = key.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some(key.to_string())
    } else {
        None
    }
}

/// Coerce `"true"` / `"false"` strings or JSON booleans.
/// Anything else behaves as absent.
fn parse_bool(value: serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(b),
        serde_json::Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
