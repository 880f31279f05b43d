//! SQLite backend for the wishlist store.
//!
//! Connections come from a bounded [`deadpool_sqlite`] pool, and all database
//! access runs on its blocking threads instead of the async runtime.

mod encode;
mod pool;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use pool::PoolConfig;
pub use store::SqliteStore;
