//! Application state shared across handlers

use std::sync::Arc;

use crate::orders::OrderService;
use crate::products::ProductService;
use crate::storage::repository::UserRepository;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub products: Arc<ProductService>,
    pub users: Arc<dyn UserRepository>,
}
