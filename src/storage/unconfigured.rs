use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::SETUP_HINT;
use crate::models::{NewProduct, Product, ProductPatch, ProductWithStore, Store};
use crate::storage::LedgerStorage;
use crate::{LedgerError, Result};

/// Placeholder used when no database is available. Every call fails with
/// [`LedgerError::NotConfigured`] so callers can show setup guidance.
#[derive(Debug, Clone)]
pub struct UnconfiguredStorage {
    reason: String,
}

impl UnconfiguredStorage {
    pub fn new() -> Self {
        Self::because(SETUP_HINT)
    }

    /// Carries a specific reason, e.g. the connection error seen at startup.
    pub fn because(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(LedgerError::NotConfigured(self.reason.clone()))
    }
}

impl Default for UnconfiguredStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStorage for UnconfiguredStorage {
    async fn list_stores(&self) -> Result<Vec<Store>> {
        self.fail()
    }

    async fn create_store(&self, _name: &str) -> Result<Store> {
        self.fail()
    }

    async fn delete_store(&self, _id: Uuid) -> Result<()> {
        self.fail()
    }

    async fn list_products(&self) -> Result<Vec<ProductWithStore>> {
        self.fail()
    }

    async fn get_product(&self, _id: Uuid) -> Result<ProductWithStore> {
        self.fail()
    }

    async fn create_product(&self, _product: NewProduct) -> Result<Product> {
        self.fail()
    }

    async fn update_product(&self, _id: Uuid, _patch: ProductPatch) -> Result<Product> {
        self.fail()
    }

    async fn delete_product(&self, _id: Uuid) -> Result<()> {
        self.fail()
    }

    async fn list_products_sold_between(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Product>> {
        self.fail()
    }
}
