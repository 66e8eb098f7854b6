//! Chat-history stores for FinSight.

pub mod noop;
pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use noop::NoopHistory;
pub use in_memory::InMemoryHistory;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteHistory;
