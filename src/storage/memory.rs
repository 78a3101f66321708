use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{NewProduct, Product, ProductPatch, ProductWithStore, Store};
use crate::storage::LedgerStorage;
use crate::{LedgerError, Result};

/// In-process storage, used by tests and `serve --in-memory`.
#[derive(Default)]
pub struct MemoryStorage {
    stores: DashMap<Uuid, Store>,
    products: DashMap<Uuid, Product>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn join(&self, product: Product) -> ProductWithStore {
        let store = self.stores.get(&product.store_id).map(|s| s.clone());
        ProductWithStore::new(product, store)
    }

    /// Holding the returned guard blocks `delete_store` for that store, so a
    /// product written under it is either visible to the cascade or rejected.
    fn lock_store(&self, id: Uuid) -> Result<Ref<'_, Uuid, Store>> {
        self.stores
            .get(&id)
            .ok_or_else(|| LedgerError::NotFound(format!("store {id}")))
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn list_stores(&self) -> Result<Vec<Store>> {
        let mut stores: Vec<Store> = self.stores.iter().map(|s| s.clone()).collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }

    async fn create_store(&self, name: &str) -> Result<Store> {
        let store = Store {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn delete_store(&self, id: Uuid) -> Result<()> {
        self.stores
            .remove(&id)
            .ok_or_else(|| LedgerError::NotFound(format!("store {id}")))?;
        self.products.retain(|_, product| product.store_id != id);
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductWithStore>> {
        let mut products: Vec<Product> = self.products.iter().map(|p| p.clone()).collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products.into_iter().map(|p| self.join(p)).collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<ProductWithStore> {
        let product = self
            .products
            .get(&id)
            .map(|p| p.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("product {id}")))?;
        Ok(self.join(product))
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let _store = self.lock_store(new.store_id)?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: new.name,
            store_id: new.store_id,
            purchase_price: new.purchase_price,
            purchase_date: new.purchase_date,
            sale_price: new.sale_price,
            sale_date: new.sale_date,
            sold_at: new.sold_at,
            product_url: new.product_url,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product> {
        let _store = match patch.store_id {
            Some(store_id) => Some(self.lock_store(store_id)?),
            None => None,
        };
        let mut entry = self
            .products
            .get_mut(&id)
            .ok_or_else(|| LedgerError::NotFound(format!("product {id}")))?;
        patch.apply(&mut entry);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<()> {
        self.products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::NotFound(format!("product {id}")))
    }

    async fn list_products_sold_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| matches!(p.sale_date, Some(d) if start <= d && d <= end))
            .map(|p| p.clone())
            .collect())
    }
}
