//! ServerBuilder for fluent wiring of the HTTP server
//!
//! # Example
//!
//! ```ignore
//! ServerBuilder::in_memory()
//!     .with_gateway(StubGateway::approving())
//!     .with_split(config.revenue_split())
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use super::router::build_router;
use super::state::AppState;
use crate::orders::{CartValidator, OrderService};
use crate::payment::{PaymentGateway, RevenueSplit, StubGateway};
use crate::products::ProductService;
use crate::storage::in_memory::{InMemoryOrderStore, InMemoryProductStore, InMemoryUserStore};
use crate::storage::repository::{
    InventoryLedger, OrderRepository, ProductRepository, UserRepository,
};

/// Builder wiring storage, payment and services into a router
pub struct ServerBuilder {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    ledger: Arc<dyn InventoryLedger>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    split: Option<RevenueSplit>,
}

impl ServerBuilder {
    /// Wire the default in-memory backend with an approving stub gateway
    pub fn in_memory() -> Self {
        let products = Arc::new(InMemoryProductStore::new());
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            products: products.clone(),
            ledger: products,
            orders: Arc::new(InMemoryOrderStore::new()),
            gateway: Arc::new(StubGateway::approving()),
            split: None,
        }
    }

    /// Wire the PostgreSQL backend onto an existing pool
    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        use crate::storage::postgres::{PgOrderStore, PgProductStore, PgUserStore};

        let products = Arc::new(PgProductStore::new(pool.clone()));
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            products: products.clone(),
            ledger: products,
            orders: Arc::new(PgOrderStore::new(pool)),
            gateway: Arc::new(StubGateway::approving()),
            split: None,
        }
    }

    /// Replace the payment gateway
    pub fn with_gateway(mut self, gateway: impl PaymentGateway + 'static) -> Self {
        self.gateway = Arc::new(gateway);
        self
    }

    /// Set the revenue split (validated configuration)
    pub fn with_split(mut self, split: Option<RevenueSplit>) -> Self {
        self.split = split;
        self
    }

    /// Build the application state without a router (used by tests)
    pub fn build_state(self) -> AppState {
        let validator = CartValidator::new(self.products.clone());
        let order_service = OrderService::new(
            self.users.clone(),
            self.orders,
            self.ledger.clone(),
            self.gateway,
            validator,
            self.split,
        );
        let product_service = ProductService::new(self.products, self.ledger);

        AppState {
            orders: Arc::new(order_service),
            products: Arc::new(product_service),
            users: self.users,
        }
    }

    /// Build the final router
    pub fn build(self) -> Router {
        build_router(self.build_state())
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds the address, serves requests, and handles SIGTERM and Ctrl+C.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
