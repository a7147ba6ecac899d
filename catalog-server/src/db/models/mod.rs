//! Document Models
//!
//! Serde models for the SurrealDB tables. Ids round-trip as "table:id"
//! strings on the API side and native record links on the database side.

pub mod category;
pub mod flash_sale;
pub mod order;
pub mod payment;
pub mod product;
pub mod serde_helpers;

pub use category::{Category, CategoryCreate, CategoryNode, CategoryUpdate};
pub use flash_sale::{FlashSale, FlashSaleCreate, FlashSaleWithProduct};
pub use order::{Order, OrderLine};
pub use payment::Payment;
pub use product::{Product, ProductCreate, ProductUpdate};
