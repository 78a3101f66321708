use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{NewProduct, Product, ProductPatch, ProductWithStore, Store};
use crate::Result;

/// Access to the persisted stores and products.
///
/// Referential integrity between products and stores is the implementation's
/// responsibility: deleting a store removes its products.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// All stores, ordered by name.
    async fn list_stores(&self) -> Result<Vec<Store>>;
    async fn create_store(&self, name: &str) -> Result<Store>;
    async fn delete_store(&self, id: Uuid) -> Result<()>;

    /// All products with their store joined, newest first.
    async fn list_products(&self) -> Result<Vec<ProductWithStore>>;
    async fn get_product(&self, id: Uuid) -> Result<ProductWithStore>;
    async fn create_product(&self, product: NewProduct) -> Result<Product>;
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product>;
    async fn delete_product(&self, id: Uuid) -> Result<()>;

    /// Products whose sale date is set and falls within `[start, end]`.
    async fn list_products_sold_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Product>>;
}

pub mod memory;
pub mod postgres;
pub mod unconfigured;
