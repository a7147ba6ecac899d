//! Product Service
//!
//! 商品 CRUD 与目录列表。列表走完整的查询管线，再叠加限时折扣价。

use std::collections::HashMap;

use serde::Serialize;
use shared::{AuthUser, ListResponse};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use tracing::info;
use validator::Validate;

use crate::db::models::{FlashSale, Product, ProductCreate, ProductUpdate};
use crate::query::{ListParams, QueryBuilder};
use crate::utils::{AppError, AppResult, slugify};

use super::flash_sale_service::{apply_offer_prices, discount_map};
use super::{now_millis, parse_record};

/// Fields the free-text search matches against
const SEARCH_FIELDS: &[&str] = &["name", "description", "brand"];

/// Persisted shape on create. `offer_price` is deliberately absent:
/// the derived sale price is never written back.
#[derive(Serialize)]
struct ProductRow {
    user_id: RecordId,
    name: String,
    slug: String,
    description: String,
    price: f64,
    stock: i64,
    weight: Option<f64>,
    parent_category: RecordId,
    sub_category: RecordId,
    third_sub_category: RecordId,
    image_urls: Vec<String>,
    brand: String,
    available_colors: Vec<String>,
    average_rating: f64,
    rating_count: i64,
    specification: serde_json::Value,
    key_features: Vec<String>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

/// MERGE payload: only provided fields are written
#[derive(Serialize)]
struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_category: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_category: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    third_sub_category: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    specification: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    updated_at: i64,
}

#[derive(Clone)]
pub struct ProductService {
    db: Surreal<Db>,
}

impl ProductService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Create a product owned by the calling user.
    /// Slug defaults to the slugified name; uniqueness of the slug is the
    /// storage layer's concern.
    pub async fn create(&self, data: ProductCreate, auth: &AuthUser) -> AppResult<Product> {
        data.validate()?;
        let slug = match data.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slugify(&data.name),
        };
        let now = now_millis();
        let row = ProductRow {
            user_id: parse_record(&auth.user_id, "user")?,
            name: data.name,
            slug,
            description: data.description,
            price: data.price,
            stock: data.stock,
            weight: data.weight,
            parent_category: parse_record(&data.parent_category, "parent category")?,
            sub_category: parse_record(&data.sub_category, "sub category")?,
            third_sub_category: parse_record(&data.third_sub_category, "third sub category")?,
            image_urls: data.image_urls,
            brand: data.brand,
            available_colors: data.available_colors,
            average_rating: 0.0,
            rating_count: 0,
            specification: data.specification,
            key_features: data.key_features,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let created: Option<Product> = self.db.create("product").content(row).await?;
        let created =
            created.ok_or_else(|| AppError::Internal("Product was not created".to_string()))?;
        info!(target: "product", slug = %created.slug, "Product created");
        Ok(created)
    }

    /// Paginated catalog listing through the full filter pipeline, with
    /// flash-sale prices overlaid on the returned page.
    pub async fn get_all(&self, params: ListParams) -> AppResult<ListResponse<Product>> {
        let query = QueryBuilder::new("product", params)
            .search(SEARCH_FIELDS)
            .filter()
            .filter_by_categories()
            .filter_by_brand_and_color()
            .price_range()
            .offer_price_range()
            .rating_range()
            .stock_range()
            .is_active_filter()
            .sort()
            .paginate()
            .fields();
        let products: Vec<Product> = query.run(&self.db).await?;
        let meta = query.count_total(&self.db).await?;
        let result = self.with_offer_prices(products).await?;
        Ok(ListResponse { meta, result })
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Product> {
        let thing = parse_record(id, "product")?;
        let product: Option<Product> = self.db.select(thing).await?;
        let product =
            product.ok_or_else(|| AppError::NotFound(format!("Product not found: {id}")))?;
        let mut overlaid = self.with_offer_prices(vec![product]).await?;
        Ok(overlaid.remove(0))
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<Product> {
        let mut result = self
            .db
            .query("SELECT * FROM product WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await?;
        let product: Option<Product> = result.take(0)?;
        let product =
            product.ok_or_else(|| AppError::NotFound(format!("Product not found: {slug}")))?;
        let mut overlaid = self.with_offer_prices(vec![product]).await?;
        Ok(overlaid.remove(0))
    }

    /// Merge the provided fields into an existing product.
    /// Standard users may only modify their own products.
    pub async fn update(
        &self,
        id: &str,
        data: ProductUpdate,
        auth: &AuthUser,
    ) -> AppResult<Product> {
        let thing = parse_record(id, "product")?;
        let existing: Option<Product> = self.db.select(thing.clone()).await?;
        let existing =
            existing.ok_or_else(|| AppError::NotFound(format!("Product not found: {id}")))?;
        self.check_owner(&existing, auth)?;

        let patch = ProductPatch {
            name: data.name,
            description: data.description,
            price: data.price,
            stock: data.stock,
            weight: data.weight,
            parent_category: parse_optional_record(data.parent_category, "parent category")?,
            sub_category: parse_optional_record(data.sub_category, "sub category")?,
            third_sub_category: parse_optional_record(
                data.third_sub_category,
                "third sub category",
            )?,
            image_urls: data.image_urls,
            brand: data.brand,
            available_colors: data.available_colors,
            specification: data.specification,
            key_features: data.key_features,
            is_active: data.is_active,
            updated_at: now_millis(),
        };
        let mut result = self
            .db
            .query("UPDATE $thing MERGE $data RETURN AFTER")
            .bind(("thing", thing))
            .bind(("data", patch))
            .await?;
        let updated: Option<Product> = result.take(0)?;
        updated.ok_or_else(|| AppError::Internal("Product update returned no record".to_string()))
    }

    pub async fn delete(&self, id: &str, auth: &AuthUser) -> AppResult<()> {
        let thing = parse_record(id, "product")?;
        let existing: Option<Product> = self.db.select(thing.clone()).await?;
        let existing =
            existing.ok_or_else(|| AppError::NotFound(format!("Product not found: {id}")))?;
        self.check_owner(&existing, auth)?;

        let _: Option<Product> = self.db.delete(thing).await?;
        info!(target: "product", id = %id, "Product deleted");
        Ok(())
    }

    fn check_owner(&self, product: &Product, auth: &AuthUser) -> AppResult<()> {
        let owner = product
            .user_id
            .as_ref()
            .map(RecordId::to_string)
            .unwrap_or_default();
        if auth.can_modify(&owner) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You can only modify your own products".to_string(),
            ))
        }
    }

    /// Fetch the flash-sale discounts for the given page and overlay them
    async fn with_offer_prices(&self, products: Vec<Product>) -> AppResult<Vec<Product>> {
        let ids: Vec<RecordId> = products.iter().filter_map(|p| p.id.clone()).collect();
        if ids.is_empty() {
            return Ok(apply_offer_prices(products, &HashMap::new()));
        }
        let sales: Vec<FlashSale> = self
            .db
            .query("SELECT * FROM flash_sale WHERE product IN $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(apply_offer_prices(products, &discount_map(&sales)))
    }
}

fn parse_optional_record(value: Option<String>, what: &str) -> AppResult<Option<RecordId>> {
    value.as_deref().map(|v| parse_record(v, what)).transpose()
}
