//! Catalog listing pipeline against an embedded database
//! Run: cargo test -p catalog-server --test product_listing

use catalog_server::db::models::Product;
use catalog_server::query::ListParams;
use catalog_server::services::ProductService;
use serde_json::json;
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::{RecordId, Surreal};
use tempfile::TempDir;

async fn setup() -> (TempDir, Surreal<Db>) {
    let tmp = tempfile::tempdir().unwrap();
    let db: Surreal<Db> = Surreal::new::<RocksDb>(tmp.path()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    (tmp, db)
}

#[derive(serde::Serialize)]
struct SeedProduct {
    name: String,
    slug: String,
    description: String,
    price: f64,
    stock: i64,
    brand: String,
    available_colors: Vec<String>,
    average_rating: f64,
    parent_category: RecordId,
    user_id: RecordId,
    warranty: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

async fn seed_product(db: &Surreal<Db>, i: i64, category: &str) {
    let seed = SeedProduct {
        name: format!("Gadget {i:03}"),
        slug: format!("gadget-{i:03}"),
        description: format!("All purpose gadget number {i}"),
        price: 10.0 * i as f64,
        stock: i,
        brand: if i % 2 == 0 { "ACME".into() } else { "Globex".into() },
        available_colors: if i % 2 == 0 {
            vec!["Red".into(), "Blue".into()]
        } else {
            vec!["Green".into()]
        },
        average_rating: (i % 5) as f64,
        parent_category: RecordId::from(("category", category)),
        user_id: RecordId::from(("user", "seeder")),
        warranty: if i <= 5 { "2y".into() } else { "1y".into() },
        is_active: i % 5 != 0,
        created_at: 1_700_000_000_000 + i * 1000,
        updated_at: 1_700_000_000_000 + i * 1000,
    };
    let _: Option<Product> = db.create("product").content(seed).await.unwrap();
}

fn params(value: serde_json::Value) -> ListParams {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn pagination_math_over_25_records() {
    let (_tmp, db) = setup().await;
    for i in 1..=25 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "page": "3", "limit": "10" })))
        .await
        .unwrap();
    assert_eq!(page.result.len(), 5);
    assert_eq!(page.meta.total, 25);
    assert_eq!(page.meta.total_page, 3);
    assert_eq!(page.meta.page, 3);
}

#[tokio::test]
async fn default_sort_is_newest_first() {
    let (_tmp, db) = setup().await;
    for i in 1..=5 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service.get_all(ListParams::default()).await.unwrap();
    assert_eq!(page.result[0].name, "Gadget 005");
    assert_eq!(page.result[4].name, "Gadget 001");
}

#[tokio::test]
async fn search_matches_substring_case_insensitively() {
    let (_tmp, db) = setup().await;
    for i in 1..=9 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "search_term": "GADGET 003" })))
        .await
        .unwrap();
    assert_eq!(page.result.len(), 1);
    assert_eq!(page.result[0].name, "Gadget 003");
}

#[tokio::test]
async fn brand_filter_is_case_insensitive_whole_match() {
    let (_tmp, db) = setup().await;
    for i in 1..=6 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "brand": "acme" })))
        .await
        .unwrap();
    assert_eq!(page.result.len(), 3);
    assert!(page.result.iter().all(|p| p.brand == "ACME"));

    // substring of a brand must not match
    let page = service
        .get_all(params(json!({ "brand": "acm" })))
        .await
        .unwrap();
    assert!(page.result.is_empty());
}

#[tokio::test]
async fn color_filter_intersects_case_insensitively() {
    let (_tmp, db) = setup().await;
    for i in 1..=4 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "available_colors": ["BLUE"] })))
        .await
        .unwrap();
    assert_eq!(page.result.len(), 2);

    let page = service
        .get_all(params(json!({ "available_colors": ["purple"] })))
        .await
        .unwrap();
    assert!(page.result.is_empty());
}

#[tokio::test]
async fn category_filter_compares_record_links() {
    let (_tmp, db) = setup().await;
    for i in 1..=3 {
        seed_product(&db, i, "electronics").await;
    }
    seed_product(&db, 4, "furniture").await;
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "parent_category": "category:furniture" })))
        .await
        .unwrap();
    assert_eq!(page.result.len(), 1);
    assert_eq!(page.result[0].name, "Gadget 004");

    // unparsable category value imposes no constraint
    let page = service
        .get_all(params(json!({ "parent_category": "not a record id" })))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 4);
}

#[tokio::test]
async fn price_range_bounds_are_inclusive() {
    let (_tmp, db) = setup().await;
    for i in 1..=9 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "min_price": "30", "max_price": "50" })))
        .await
        .unwrap();
    assert_eq!(page.result.len(), 3);
    assert!(page.result.iter().all(|p| p.price >= 30.0 && p.price <= 50.0));
}

#[tokio::test]
async fn active_flag_accepts_string_and_bool_ignores_garbage() {
    let (_tmp, db) = setup().await;
    for i in 1..=10 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    // i = 5 and i = 10 are inactive
    let page = service
        .get_all(params(json!({ "is_active": "true" })))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 8);

    let page = service
        .get_all(params(json!({ "is_active": false })))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);

    let page = service
        .get_all(params(json!({ "is_active": "banana" })))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 10);
}

#[tokio::test]
async fn unrecognized_key_filters_by_direct_equality() {
    let (_tmp, db) = setup().await;
    for i in 1..=8 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "warranty": "2y" })))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 5);
}

#[tokio::test]
async fn projection_narrows_returned_fields() {
    let (_tmp, db) = setup().await;
    for i in 1..=3 {
        seed_product(&db, i, "electronics").await;
    }
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "fields": "name,price", "sort": "price" })))
        .await
        .unwrap();
    assert_eq!(page.result.len(), 3);
    assert_eq!(page.result[0].name, "Gadget 001");
    assert_eq!(page.result[0].price, 10.0);
    // unprojected fields come back as defaults
    assert!(page.result[0].brand.is_empty());
}

#[tokio::test]
async fn listing_overlays_flash_sale_prices() {
    let (_tmp, db) = setup().await;
    for i in 1..=3 {
        seed_product(&db, i, "electronics").await;
    }
    let discounted: Vec<Product> = db
        .query("SELECT * FROM product WHERE name = 'Gadget 002'")
        .await
        .unwrap()
        .take(0)
        .unwrap();
    let target = discounted[0].id.clone().unwrap();
    db.query(
        "CREATE flash_sale CONTENT { product: $p, discount_percentage: 50.0, created_at: 0 }",
    )
    .bind(("p", target))
    .await
    .unwrap();
    let service = ProductService::new(db);

    let page = service
        .get_all(params(json!({ "sort": "price" })))
        .await
        .unwrap();
    assert_eq!(page.result[1].name, "Gadget 002");
    assert_eq!(page.result[1].price, 20.0);
    assert_eq!(page.result[1].offer_price, Some(10.0));
    assert_eq!(page.result[0].offer_price, None);
    assert_eq!(page.result[2].offer_price, None);
}

#[tokio::test]
async fn get_by_slug_and_missing_slug_not_found() {
    let (_tmp, db) = setup().await;
    seed_product(&db, 1, "electronics").await;
    let service = ProductService::new(db);

    let found = service.get_by_slug("gadget-001").await.unwrap();
    assert_eq!(found.name, "Gadget 001");

    let missing = service.get_by_slug("no-such-slug").await;
    assert!(matches!(
        missing,
        Err(catalog_server::AppError::NotFound(_))
    ));
}
