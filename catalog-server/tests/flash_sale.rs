//! Flash-sale overlay: idempotent creation and derived pricing
//! Run: cargo test -p catalog-server --test flash_sale

use catalog_server::AppError;
use catalog_server::db::models::{FlashSaleCreate, Product};
use catalog_server::query::ListParams;
use catalog_server::services::FlashSaleService;
use serde_json::json;
use shared::{AuthUser, UserRole};
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::{RecordId, Surreal};
use tempfile::TempDir;

async fn setup() -> (TempDir, FlashSaleService, Surreal<Db>) {
    let tmp = tempfile::tempdir().unwrap();
    let db: Surreal<Db> = Surreal::new::<RocksDb>(tmp.path()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    (tmp, FlashSaleService::new(db.clone()), db)
}

fn admin() -> AuthUser {
    AuthUser::new("user:admin", UserRole::Admin)
}

async fn seed_product(db: &Surreal<Db>, key: &str, price: f64) -> RecordId {
    #[derive(serde::Serialize)]
    struct Seed {
        name: String,
        price: f64,
        created_at: i64,
    }
    let id = RecordId::from(("product", key));
    let _: Option<Product> = db
        .create(id.clone())
        .content(Seed {
            name: key.to_string(),
            price,
            created_at: 1_700_000_000_000,
        })
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn discount_derives_offer_price() {
    let (_tmp, service, db) = setup().await;
    let id = seed_product(&db, "lamp", 100.0).await;

    let sales = service
        .create(
            FlashSaleCreate {
                products: vec![id.to_string()],
                discount_percentage: 20.0,
            },
            &admin(),
        )
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].discount_percentage, 20.0);

    let page = service.get_active(ListParams::default()).await.unwrap();
    assert_eq!(page.result.len(), 1);
    assert_eq!(page.result[0].price, 100.0);
    assert_eq!(page.result[0].offer_price, Some(80.0));
}

#[tokio::test]
async fn first_discount_wins_on_repeat_create() {
    let (_tmp, service, db) = setup().await;
    let id = seed_product(&db, "lamp", 100.0).await;
    let payload = |pct| FlashSaleCreate {
        products: vec![id.to_string()],
        discount_percentage: pct,
    };

    service.create(payload(20.0), &admin()).await.unwrap();
    let second = service.create(payload(50.0), &admin()).await.unwrap();

    // the later percentage is ignored, and no second row appears
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].discount_percentage, 20.0);

    let page = service.get_active(ListParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.result[0].offer_price, Some(80.0));
}

#[tokio::test]
async fn one_percentage_fans_out_over_many_products() {
    let (_tmp, service, db) = setup().await;
    let a = seed_product(&db, "a", 10.0).await;
    let b = seed_product(&db, "b", 40.0).await;

    let sales = service
        .create(
            FlashSaleCreate {
                products: vec![a.to_string(), b.to_string()],
                discount_percentage: 25.0,
            },
            &admin(),
        )
        .await
        .unwrap();
    assert_eq!(sales.len(), 2);

    let page = service.get_active(ListParams::default()).await.unwrap();
    let mut offers: Vec<Option<f64>> = page.result.iter().map(|p| p.offer_price).collect();
    offers.sort_by(|x, y| x.partial_cmp(y).unwrap());
    assert_eq!(offers, vec![Some(7.5), Some(30.0)]);
}

#[tokio::test]
async fn out_of_range_percentage_is_rejected() {
    let (_tmp, service, db) = setup().await;
    let id = seed_product(&db, "lamp", 100.0).await;

    for pct in [0.0, -5.0, 100.5] {
        let result = service
            .create(
                FlashSaleCreate {
                    products: vec![id.to_string()],
                    discount_percentage: pct,
                },
                &admin(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

#[tokio::test]
async fn active_listing_paginates() {
    let (_tmp, service, db) = setup().await;
    for i in 0..5 {
        let id = seed_product(&db, &format!("p{i}"), 10.0).await;
        service
            .create(
                FlashSaleCreate {
                    products: vec![id.to_string()],
                    discount_percentage: 10.0,
                },
                &admin(),
            )
            .await
            .unwrap();
    }

    let params: ListParams = serde_json::from_value(json!({ "page": "2", "limit": "2" })).unwrap();
    let page = service.get_active(params).await.unwrap();
    assert_eq!(page.result.len(), 2);
    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_page, 3);
}

#[tokio::test]
async fn sale_for_deleted_product_is_skipped() {
    let (_tmp, service, db) = setup().await;
    let keep = seed_product(&db, "keep", 10.0).await;
    let gone = seed_product(&db, "gone", 10.0).await;
    service
        .create(
            FlashSaleCreate {
                products: vec![keep.to_string(), gone.to_string()],
                discount_percentage: 10.0,
            },
            &admin(),
        )
        .await
        .unwrap();
    let _: Option<Product> = db.delete(gone).await.unwrap();

    let page = service.get_active(ListParams::default()).await.unwrap();
    assert_eq!(page.result.len(), 1);
    assert_eq!(page.result[0].name, "keep");
    // the sale row itself survives, so the count still includes it
    assert_eq!(page.meta.total, 2);
}
