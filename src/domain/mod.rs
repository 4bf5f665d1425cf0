//! Domain model: users, products, orders and cart classification

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartItemRequest, CartValidation, InvalidCartItem, InvalidReason, ValidCartItem};
pub use order::{
    BillingAddress, CardData, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
};
pub use product::{Product, ProductStatus};
pub use user::{User, UserStatus};
