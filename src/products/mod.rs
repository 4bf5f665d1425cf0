//! Product catalog service
//!
//! Thin CRUD over the product repository, plus restocking through the
//! inventory ledger. Quantity is never written through `update`; the
//! ledger's atomic operations are the only mutation path.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::error::{ApiError, ApiResult, ValidationError};
use crate::domain::{Product, ProductStatus};
use crate::storage::repository::{InventoryLedger, ProductRepository};

/// Input for product creation
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub external_url: Option<String>,
}

/// Input for product updates; quantity is deliberately absent
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<ProductStatus>,
    pub external_url: Option<String>,
}

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    ledger: Arc<dyn InventoryLedger>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, ledger: Arc<dyn InventoryLedger>) -> Self {
        Self { products, ledger }
    }

    pub async fn create_product(&self, input: CreateProductInput) -> ApiResult<Product> {
        if input.name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "name" }.into());
        }

        let mut product = Product::new(input.name, input.price, input.quantity);
        product.description = input.description;
        product.external_url = input.external_url;
        product.validate()?;

        self.products.create(product).await
    }

    pub async fn get_product(&self, id: &Uuid) -> ApiResult<Product> {
        self.products.get(id).await?.ok_or(ApiError::NotFound {
            resource: "product",
            id: *id,
        })
    }

    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.products.list().await
    }

    pub async fn update_product(
        &self,
        id: &Uuid,
        input: UpdateProductInput,
    ) -> ApiResult<Product> {
        let mut product = self.get_product(id).await?;

        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = Some(description);
        }
        if let Some(price) = input.price {
            product.price = Some(price);
        }
        if let Some(status) = input.status {
            product.status = status;
        }
        if let Some(external_url) = input.external_url {
            product.external_url = Some(external_url);
        }

        product.validate()?;
        product.touch();
        self.products.update(product).await
    }

    pub async fn delete_product(&self, id: &Uuid) -> ApiResult<()> {
        self.products.soft_delete(id).await
    }

    /// Restock through the ledger's atomic increment
    pub async fn restock(&self, id: &Uuid, quantity: i64) -> ApiResult<Product> {
        if quantity <= 0 {
            return Err(ValidationError::InvalidField {
                field: "quantity",
                message: format!("must be positive (got {})", quantity),
            }
            .into());
        }

        self.ledger.release(id, quantity).await?;
        self.get_product(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::in_memory::InMemoryProductStore;
    use rust_decimal_macros::dec;

    fn service() -> (ProductService, Arc<InMemoryProductStore>) {
        let store = Arc::new(InMemoryProductStore::new());
        (ProductService::new(store.clone(), store.clone()), store)
    }

    fn input(name: &str, price: Option<Decimal>, quantity: Option<i64>) -> CreateProductInput {
        CreateProductInput {
            name: name.to_string(),
            description: None,
            price,
            quantity,
            external_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, _) = service();
        let created = service
            .create_product(input("Yoga mat", Some(dec!(89.90)), Some(10)))
            .await
            .unwrap();
        let fetched = service.get_product(&created.id).await.unwrap();
        assert_eq!(fetched.name, "Yoga mat");
        assert_eq!(fetched.quantity, Some(10));
    }

    #[tokio::test]
    async fn test_create_rejects_external_url_with_stock() {
        let (service, _) = service();
        let mut bad = input("Partner supplement", None, Some(5));
        bad.external_url = Some("https://partner.example/supplement".to_string());
        assert!(service.create_product(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_update_cannot_change_quantity() {
        let (service, _) = service();
        let created = service
            .create_product(input("Yoga mat", Some(dec!(89.90)), Some(10)))
            .await
            .unwrap();

        let updated = service
            .update_product(
                &created.id,
                UpdateProductInput {
                    price: Some(dec!(99.90)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, Some(dec!(99.90)));
        assert_eq!(updated.quantity, Some(10));
    }

    #[tokio::test]
    async fn test_restock_goes_through_ledger() {
        let (service, store) = service();
        let created = service
            .create_product(input("Yoga mat", Some(dec!(89.90)), Some(2)))
            .await
            .unwrap();

        let restocked = service.restock(&created.id, 8).await.unwrap();
        assert_eq!(restocked.quantity, Some(10));
        assert_eq!(
            store.get(&created.id).await.unwrap().unwrap().quantity,
            Some(10)
        );
    }

    #[tokio::test]
    async fn test_restock_rejects_non_positive() {
        let (service, _) = service();
        let created = service
            .create_product(input("Yoga mat", Some(dec!(89.90)), Some(2)))
            .await
            .unwrap();
        assert!(service.restock(&created.id, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_hides_product() {
        let (service, _) = service();
        let created = service
            .create_product(input("Yoga mat", Some(dec!(89.90)), Some(2)))
            .await
            .unwrap();

        service.delete_product(&created.id).await.unwrap();
        let err = service.get_product(&created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }
}
