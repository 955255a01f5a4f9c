//! Storage adapters implementing the `domains` store ports.
//!
//! The in-memory store is always compiled and backs the test suites and
//! volatile deployments. The Postgres store sits behind the `db-postgres`
//! feature and is the durable option for real installs.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
