//! Utility Functions Module

pub mod error;
pub mod logger;
pub mod result;
pub mod slug;

pub use error::AppError;
pub use result::AppResult;
pub use slug::slugify;
