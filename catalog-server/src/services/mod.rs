//! 业务服务层
//!
//! 每个服务持有一个嵌入式数据库句柄，对外暴露领域操作：
//! - [`ProductService`]: 商品 CRUD 与列表查询
//! - [`CategoryService`]: 分类树管理（全路径 slug、级联删除）
//! - [`FlashSaleService`]: 限时折扣与派生价格覆盖
//! - [`MetaService`]: 聚合报表
//!
//! 权限约定：写操作需要 [`shared::AuthUser`]，标准角色只能修改自己
//! 创建的记录，管理员不受限。

pub mod category_service;
pub mod flash_sale_service;
pub mod meta_service;
pub mod product_service;

pub use category_service::CategoryService;
pub use flash_sale_service::FlashSaleService;
pub use meta_service::MetaService;
pub use product_service::ProductService;

use surrealdb::RecordId;

use crate::utils::{AppError, AppResult};

/// Current wall-clock time in epoch milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse a `"table:id"` reference supplied by a caller.
/// Write paths reject malformed references outright, unlike the
/// fail-open listing filters.
pub(crate) fn parse_record(value: &str, what: &str) -> AppResult<RecordId> {
    value
        .trim()
        .parse::<RecordId>()
        .map_err(|_| AppError::Validation(format!("Invalid {what} reference: {value}")))
}
