//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;

pub use in_memory::{InMemoryOrderStore, InMemoryProductStore, InMemoryUserStore};
#[cfg(feature = "postgres")]
pub use postgres::{PgOrderStore, PgProductStore, PgUserStore};
pub use repository::{InventoryLedger, OrderRepository, ProductRepository, UserRepository};
