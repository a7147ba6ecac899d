//! Flash Sale Service
//!
//! 限时折扣：每个商品最多持有一条折扣记录，先写者胜。
//! 折扣价是读取时派生的，`price` 永不改写。

use std::collections::HashMap;

use shared::{AuthUser, ListResponse};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::info;
use validator::Validate;

use crate::db::models::{FlashSale, FlashSaleCreate, FlashSaleWithProduct, Product};
use crate::query::{ListParams, QueryBuilder};
use crate::utils::AppResult;

use super::{now_millis, parse_record};

/// Insert-if-absent in one atomic block: a concurrent writer for the same
/// product cannot slip a second discount in between the check and the create.
const UPSERT_SQL: &str = "\
    LET $existing = (SELECT VALUE id FROM flash_sale WHERE product = $product); \
    IF array::len($existing) = 0 { \
        CREATE flash_sale CONTENT { \
            product: $product, \
            discount_percentage: $pct, \
            created_by: $user, \
            created_at: $now \
        }; \
    };";

#[derive(Clone)]
pub struct FlashSaleService {
    db: Surreal<Db>,
}

impl FlashSaleService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Put one discount percentage on each listed product.
    ///
    /// Idempotent per product: a product that already carries a discount
    /// keeps its original percentage. Returns the discounts now in effect
    /// for the listed products, whichever writer created them.
    pub async fn create(&self, data: FlashSaleCreate, auth: &AuthUser) -> AppResult<Vec<FlashSale>> {
        data.validate()?;
        let user = parse_record(&auth.user_id, "user")?;
        let mut product_ids = Vec::with_capacity(data.products.len());
        for raw in &data.products {
            product_ids.push(parse_record(raw, "product")?);
        }

        let now = now_millis();
        for product in &product_ids {
            let result = self
                .db
                .query(UPSERT_SQL)
                .bind(("product", product.clone()))
                .bind(("pct", data.discount_percentage))
                .bind(("user", user.clone()))
                .bind(("now", now))
                .await?;
            result.check()?;
        }
        info!(
            target: "flash_sale",
            products = product_ids.len(),
            percentage = data.discount_percentage,
            "Flash sale applied"
        );

        let mut result = self
            .db
            .query("SELECT * FROM flash_sale WHERE product IN $ids")
            .bind(("ids", product_ids))
            .await?;
        Ok(result.take(0)?)
    }

    /// Currently discounted products, paginated, each carrying its derived
    /// `offer_price`. Sales whose product has since been deleted are
    /// skipped after the count, so `meta.total` still counts every sale
    /// row and may exceed the page length.
    pub async fn get_active(&self, params: ListParams) -> AppResult<ListResponse<Product>> {
        let query = QueryBuilder::new("flash_sale", params)
            .sort()
            .paginate()
            .fetch_link("product");
        let rows: Vec<FlashSaleWithProduct> = query.run(&self.db).await?;
        let meta = query.count_total(&self.db).await?;

        let discounts: HashMap<String, f64> = rows
            .iter()
            .filter_map(|row| {
                let id = row.product.as_ref()?.id.as_ref()?;
                Some((id.to_string(), row.discount_percentage))
            })
            .collect();
        let products: Vec<Product> = rows.into_iter().filter_map(|row| row.product).collect();

        Ok(ListResponse {
            meta,
            result: apply_offer_prices(products, &discounts),
        })
    }
}

/// Active discounts keyed by product id string
pub fn discount_map(sales: &[FlashSale]) -> HashMap<String, f64> {
    sales
        .iter()
        .filter_map(|sale| {
            Some((
                sale.product.as_ref()?.to_string(),
                sale.discount_percentage,
            ))
        })
        .collect()
}

/// Overlay derived sale prices onto a product page.
///
/// A discounted product gets `offer_price = price - (pct/100) * price`;
/// everything else gets an explicit `None` so the serialized output always
/// carries the field. Base `price` is never touched.
pub fn apply_offer_prices(
    mut products: Vec<Product>,
    discounts: &HashMap<String, f64>,
) -> Vec<Product> {
    for product in &mut products {
        let pct = product
            .id
            .as_ref()
            .and_then(|id| discounts.get(&id.to_string()));
        product.offer_price = pct.map(|pct| product.price - (pct / 100.0) * product.price);
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: Some(id.parse().unwrap()),
            price,
            ..serde_json::from_value(serde_json::json!({})).unwrap()
        }
    }

    #[test]
    fn overlay_derives_price_without_touching_base() {
        let discounts = HashMap::from([("product:a".to_string(), 20.0)]);
        let out = apply_offer_prices(vec![product("product:a", 100.0)], &discounts);
        assert_eq!(out[0].price, 100.0);
        assert_eq!(out[0].offer_price, Some(80.0));
    }

    #[test]
    fn undiscounted_product_serializes_explicit_null() {
        let out = apply_offer_prices(vec![product("product:b", 50.0)], &HashMap::new());
        assert_eq!(out[0].offer_price, None);
        let json = serde_json::to_value(&out[0]).unwrap();
        assert!(json.get("offer_price").is_some());
        assert!(json["offer_price"].is_null());
    }

    #[test]
    fn percentage_validation_bounds() {
        let over = FlashSaleCreate {
            products: vec!["product:a".to_string()],
            discount_percentage: 101.0,
        };
        assert!(over.validate().is_err());

        let zero = FlashSaleCreate {
            products: vec!["product:a".to_string()],
            discount_percentage: 0.0,
        };
        assert!(zero.validate().is_err());

        let full = FlashSaleCreate {
            products: vec!["product:a".to_string()],
            discount_percentage: 100.0,
        };
        assert!(full.validate().is_ok());
    }
}
