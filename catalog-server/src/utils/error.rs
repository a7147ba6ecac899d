//! 统一错误处理
//!
//! 提供应用级错误类型：[`AppError`]
//!
//! # 错误分类
//!
//! | 分类 | 说明 |
//! |------|------|
//! | 权限错误 | 无权修改他人创建的资源 |
//! | 业务逻辑错误 | 资源不存在、同级重名、分类仍被商品引用 |
//! | 系统错误 | 数据库错误、内部错误 |
//!
//! 过滤参数解析失败不属于错误：按 fail-open 策略降级为默认值或空操作。

use tracing::error;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 权限错误 ==========
    #[error("Permission denied: {0}")]
    /// 无权限 (403)
    Forbidden(String),

    // ========== 业务逻辑错误 ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Conflict: {0}")]
    /// 资源冲突：重名或仍被引用 (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("No results in range: {0}")]
    /// 日期窗口内无匹配记录 (404)，区别于空成功
    NoResultsInRange(String),

    // ========== 系统错误 ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl AppError {
    /// Stable error code for the request layer to translate
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Forbidden(_) => "E2001",
            AppError::NotFound(_) => "E0003",
            AppError::Conflict(_) => "E0004",
            AppError::Validation(_) => "E0002",
            AppError::NoResultsInRange(_) => "E0007",
            AppError::Database(_) => "E9002",
            AppError::Internal(_) => "E9001",
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(err: surrealdb::Error) -> Self {
        error!(target: "database", error = %err, "Database error occurred");
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
