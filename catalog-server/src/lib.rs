//! Bazaar Catalog Server - query and category-hierarchy core
//!
//! # 架构概述
//!
//! 本模块是商品目录服务的核心，提供以下功能：
//!
//! - **查询构建** (`query`): 搜索/过滤/排序/分页/投影的组合式查询管道
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **分类树** (`services/category_service`): 层级 slug、树重建、级联删除
//! - **闪购折扣** (`services/flash_sale_service`): 读取时折扣价叠加
//! - **报表聚合** (`services/meta_service`): 仪表盘统计
//!
//! # 模块结构
//!
//! ```text
//! catalog-server/src/
//! ├── config.rs      # 环境配置
//! ├── db/            # 数据库层 (连接 + 文档模型)
//! ├── query/         # 查询规格构建器
//! ├── services/      # 领域服务
//! └── utils/         # 错误、日志、slug 工具
//! ```

pub mod config;
pub mod db;
pub mod query;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use config::Config;
pub use query::{ListParams, QueryBuilder};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger;
