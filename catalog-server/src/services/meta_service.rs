//! Meta Service
//!
//! 管理面板聚合报表。所有聚合都容忍空表：返回零值或空集合，
//! 唯一的例外是按日期查询订单时窗口内无记录，返回专门的错误。
//!
//! 日期分桶在 UTC 下进行；“今日销售额”按本地日历日取边界，
//! 与分桶口径不同，这是沿袭下来的口径差异。

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;

use crate::db::models::{Category, OrderLine};
use crate::utils::{AppError, AppResult};

/// Seconds-precision day bucket of an epoch-millis field
const DAY_BUCKET: &str = "time::format(time::from::unix(<int>math::floor(created_at / 1000)), '%Y-%m-%d')";

/// Optional inclusive date window, `YYYY-MM-DD` bounds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportWindow {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetaData {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_payments: i64,
    pub total_revenue: f64,
    pub todays_sales: f64,
    pub payment_status_counts: Vec<PaymentStatusCount>,
    pub category_revenue: Vec<CategoryRevenue>,
    pub orders_per_month: Vec<MonthlyOrders>,
    pub daily_sales: Vec<DailySales>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentStatusCount {
    pub status: String,
    pub total_payments: i64,
}

/// One pie slice: revenue attributed to a top-level category
#[derive(Debug, Serialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub total_amount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyOrders {
    pub year: String,
    pub month: String,
    pub total_orders: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailySales {
    pub date: String,
    pub total_sales: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyOrderCount {
    pub date: String,
    pub total_orders: i64,
}

#[derive(Clone)]
pub struct MetaService {
    db: Surreal<Db>,
}

impl MetaService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Dashboard aggregate; the window bounds the daily sales series only
    pub async fn get_meta_data(&self, window: &ReportWindow) -> AppResult<MetaData> {
        Ok(MetaData {
            total_users: self.count_table("user").await?,
            total_products: self.count_table("product").await?,
            total_orders: self.count_table("`order`").await?,
            total_payments: self.count_table("payment").await?,
            total_revenue: self.total_revenue().await?,
            todays_sales: self.todays_sales().await?,
            payment_status_counts: self.payment_status_counts().await?,
            category_revenue: self.category_revenue().await?,
            orders_per_month: self.orders_per_month().await?,
            daily_sales: self.daily_sales(window).await?,
        })
    }

    /// Per-day order counts for one day or an inclusive range.
    /// Zero matches inside the window is an error, distinct from an
    /// empty listing.
    pub async fn get_orders_by_date(
        &self,
        start_date: &str,
        end_date: Option<&str>,
    ) -> AppResult<Vec<DailyOrderCount>> {
        let start = normalize_date(start_date)?;
        let end = end_date.map(normalize_date).transpose()?;

        let sql = format!(
            "SELECT {DAY_BUCKET} AS date, count() AS total_orders \
             FROM `order` GROUP BY date ORDER BY date ASC"
        );
        let rows: Vec<DailyOrderCount> = self.db.query(sql).await?.take(0)?;

        // ISO date strings compare lexicographically in calendar order
        let matched: Vec<DailyOrderCount> = rows
            .into_iter()
            .filter(|row| match &end {
                Some(end) => row.date.as_str() >= start.as_str() && row.date.as_str() <= end.as_str(),
                None => row.date == start,
            })
            .collect();
        if matched.is_empty() {
            return Err(AppError::NoResultsInRange(
                "No orders found in the requested date range".to_string(),
            ));
        }
        Ok(matched)
    }

    async fn count_table(&self, table: &str) -> AppResult<i64> {
        let mut result = self
            .db
            .query(format!("SELECT count() FROM {table} GROUP ALL"))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    async fn total_revenue(&self) -> AppResult<f64> {
        let mut result = self
            .db
            .query("SELECT math::sum(total_amount) AS total FROM `order` GROUP ALL")
            .await?;
        let total: Option<f64> = result.take((0, "total"))?;
        Ok(total.unwrap_or(0.0))
    }

    async fn todays_sales(&self) -> AppResult<f64> {
        let (start, end) = local_today_bounds();
        let mut result = self
            .db
            .query(
                "SELECT math::sum(total_amount) AS total FROM `order` \
                 WHERE created_at >= $start AND created_at <= $end GROUP ALL",
            )
            .bind(("start", start))
            .bind(("end", end))
            .await?;
        let total: Option<f64> = result.take((0, "total"))?;
        Ok(total.unwrap_or(0.0))
    }

    async fn payment_status_counts(&self) -> AppResult<Vec<PaymentStatusCount>> {
        let mut result = self
            .db
            .query(
                "SELECT status, count() AS total_payments FROM payment \
                 GROUP BY status ORDER BY status ASC",
            )
            .await?;
        Ok(result.take(0)?)
    }

    /// Revenue pie: order lines folded by their captured top-level
    /// category, names resolved in one follow-up query. Lines without a
    /// category are skipped.
    async fn category_revenue(&self) -> AppResult<Vec<CategoryRevenue>> {
        #[derive(Deserialize)]
        struct OrderLines {
            #[serde(default)]
            products: Vec<OrderLine>,
        }

        let rows: Vec<OrderLines> = self
            .db
            .query("SELECT products FROM `order`")
            .await?
            .take(0)?;

        let mut totals: HashMap<String, f64> = HashMap::new();
        for row in rows {
            for line in row.products {
                let Some(category) = line.parent_category else {
                    continue;
                };
                *totals.entry(category.to_string()).or_insert(0.0) +=
                    line.unit_price * line.quantity as f64;
            }
        }
        if totals.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<RecordId> = totals.keys().filter_map(|k| k.parse().ok()).collect();
        let categories: Vec<Category> = self
            .db
            .query("SELECT * FROM category WHERE id IN $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        let names: HashMap<String, String> = categories
            .iter()
            .filter_map(|c| Some((c.id.as_ref()?.to_string(), c.name.clone())))
            .collect();

        let mut slices: Vec<CategoryRevenue> = totals
            .into_iter()
            .map(|(id, total_amount)| CategoryRevenue {
                category: names.get(&id).cloned().unwrap_or(id),
                total_amount,
            })
            .collect();
        // largest slice first; name breaks ties so the order is stable
        slices.sort_by(|a, b| {
            b.total_amount
                .partial_cmp(&a.total_amount)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(slices)
    }

    async fn orders_per_month(&self) -> AppResult<Vec<MonthlyOrders>> {
        let sql = "SELECT \
             time::format(time::from::unix(<int>math::floor(created_at / 1000)), '%Y') AS year, \
             time::format(time::from::unix(<int>math::floor(created_at / 1000)), '%m') AS month, \
             count() AS total_orders \
             FROM `order` GROUP BY year, month ORDER BY year ASC, month ASC";
        Ok(self.db.query(sql).await?.take(0)?)
    }

    async fn daily_sales(&self, window: &ReportWindow) -> AppResult<Vec<DailySales>> {
        let bounds = window_bounds(window)?;
        let mut sql = format!("SELECT {DAY_BUCKET} AS date, math::sum(total_amount) AS total_sales FROM `order`");
        if bounds.is_some() {
            sql.push_str(" WHERE created_at >= $start AND created_at <= $end");
        }
        sql.push_str(" GROUP BY date ORDER BY date ASC");

        let mut query = self.db.query(sql);
        if let Some((start, end)) = bounds {
            query = query.bind(("start", start)).bind(("end", end));
        }
        Ok(query.await?.take(0)?)
    }
}

/// Validate and canonicalize a `YYYY-MM-DD` date string
fn normalize_date(value: &str) -> AppResult<String> {
    let day = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {value}")))?;
    Ok(day.format("%Y-%m-%d").to_string())
}

/// Inclusive epoch-millis bounds for the daily-sales window, in UTC to
/// match the bucketing. Either bound defaults to the other when only one
/// is supplied; no window means no bounds.
fn window_bounds(window: &ReportWindow) -> AppResult<Option<(i64, i64)>> {
    let parse = |value: &String| -> AppResult<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("Invalid date: {value}")))
    };
    let start = window.start_date.as_ref().map(parse).transpose()?;
    let end = window.end_date.as_ref().map(parse).transpose()?;
    let (start, end) = match (start, end) {
        (None, None) => return Ok(None),
        (Some(s), None) => (s, s),
        (None, Some(e)) => (e, e),
        (Some(s), Some(e)) => (s, e),
    };
    let start_ms = start.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    let end_ms = (end.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1))
        .and_utc()
        .timestamp_millis();
    Ok(Some((start_ms, end_ms)))
}

/// Local calendar-day bounds, 00:00:00.000 through 23:59:59.999
fn local_today_bounds() -> (i64, i64) {
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    let start = midnight
        .and_local_timezone(Local)
        .single()
        .map(|t| t.timestamp_millis())
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis());
    (start, start + 86_400_000 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive_whole_days() {
        let window = ReportWindow {
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-03-02".to_string()),
        };
        let (start, end) = window_bounds(&window).unwrap().unwrap();
        assert_eq!(end - start, 2 * 86_400_000 - 1);
    }

    #[test]
    fn single_bound_collapses_to_one_day() {
        let window = ReportWindow {
            start_date: Some("2024-03-01".to_string()),
            end_date: None,
        };
        let (start, end) = window_bounds(&window).unwrap().unwrap();
        assert_eq!(end - start, 86_400_000 - 1);
    }

    #[test]
    fn empty_window_means_unbounded() {
        assert!(window_bounds(&ReportWindow::default()).unwrap().is_none());
    }

    #[test]
    fn garbage_date_is_rejected() {
        let window = ReportWindow {
            start_date: Some("03/01/2024".to_string()),
            end_date: None,
        };
        assert!(matches!(
            window_bounds(&window),
            Err(AppError::Validation(_))
        ));
        assert!(normalize_date("not-a-date").is_err());
        assert_eq!(normalize_date(" 2024-03-01 ").unwrap(), "2024-03-01");
    }

    #[test]
    fn local_day_spans_exactly_one_day() {
        let (start, end) = local_today_bounds();
        assert_eq!(end - start, 86_400_000 - 1);
    }
}
