//! Query Specification Builder
//!
//! Composable search/filter/sort/paginate/projection pipeline over a
//! SurrealDB table. Stages accumulate conjunctively; every stage is
//! fail-open on malformed input.

pub mod builder;
pub mod params;

pub use builder::QueryBuilder;
pub use params::{ListParams, OneOrMany};
