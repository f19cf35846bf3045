//! Local SQLite store for the `marketing_performance` table, ad-hoc query
//! execution, and the read-through dataset cache.

pub mod cache;
pub mod sqlite;
pub mod table;

pub use cache::DatasetCache;
pub use sqlite::{MarketingStore, TABLE_NAME};
pub use table::{CellValue, QueryTable};
