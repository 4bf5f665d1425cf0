//! # Wellmarket
//!
//! Order, inventory and payment core for a wellness marketplace REST
//! backend.
//!
//! ## Features
//!
//! - **Cart Validation**: pure classification of requested items against
//!   the catalog, with a single precedence-ordered reason per rejection
//! - **Inventory Ledger**: atomic reserve/release; two concurrent
//!   reservations of the last unit can never both succeed
//! - **Order Lifecycle**: create, read, update, cancel and soft-delete
//!   with all-or-nothing reservation and compensating release on failure
//! - **Payment Adapter**: gateway behind a trait, with optional revenue
//!   splitting validated at startup
//! - **Typed Errors**: structural error matching mapped to HTTP status
//!   codes, never message inspection
//! - **Soft Delete Support**: tagged deletion state, filtered at the
//!   repository boundary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wellmarket::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::default();
//!     ServerBuilder::in_memory()
//!         .with_split(config.revenue_split())
//!         .serve(&config.bind_addr())
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod orders;
pub mod payment;
pub mod products;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::AuthContext,
        entity::{Deletion, Entity},
        error::{ApiError, ApiResult, AuthError, ConflictError, PaymentError, ValidationError},
    };

    // === Domain ===
    pub use crate::domain::{
        CartItemRequest, CartValidation, InvalidCartItem, InvalidReason, Order, OrderItem,
        OrderStatus, PaymentMethod, PaymentStatus, Product, ProductStatus, User, UserStatus,
        ValidCartItem,
    };

    // === Services ===
    pub use crate::orders::{CartValidator, CreateOrderInput, OrderService, UpdateOrderInput};
    pub use crate::payment::{
        ChargeOutcome, ChargeRequest, ChargeStatus, PaymentGateway, RevenueSplit, StubGateway,
    };
    pub use crate::products::ProductService;

    // === Storage ===
    pub use crate::storage::in_memory::{
        InMemoryOrderStore, InMemoryProductStore, InMemoryUserStore,
    };
    pub use crate::storage::repository::{
        InventoryLedger, OrderRepository, ProductRepository, UserRepository,
    };
    #[cfg(feature = "postgres")]
    pub use crate::storage::postgres::{PgOrderStore, PgProductStore, PgUserStore};

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
