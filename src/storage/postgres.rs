use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{products, stores};
use crate::models::{NewProduct, Product, ProductPatch, ProductWithStore, Store};
use crate::storage::LedgerStorage;
use crate::{LedgerError, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stores (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS products (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    store_id UUID NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
    purchase_price NUMERIC(12, 2) NOT NULL,
    purchase_date DATE NOT NULL,
    sale_price NUMERIC(12, 2),
    sale_date DATE,
    sold_at TEXT,
    product_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS products_store_id_idx ON products (store_id);
CREATE INDEX IF NOT EXISTS products_sale_date_idx ON products (sale_date);
"#;

/// PostgreSQL-backed storage. Deletes cascade through the foreign key.
pub struct PostgresStorage {
    db: DatabaseConnection,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options.max_connections(max_connections).sqlx_logging(false);

        let db = Database::connect(options).await?;
        Self::init_database(&db).await?;
        info!(max_connections, "connected to postgres");

        Ok(Self { db })
    }

    async fn init_database(db: &DatabaseConnection) -> Result<()> {
        db.execute_unprepared(SCHEMA).await?;
        debug!("schema ensured");
        Ok(())
    }

    async fn find_product(&self, id: Uuid) -> Result<products::Model> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("product {id}")))
    }
}

#[async_trait]
impl LedgerStorage for PostgresStorage {
    async fn list_stores(&self) -> Result<Vec<Store>> {
        let stores = stores::Entity::find()
            .order_by_asc(stores::Column::Name)
            .all(&self.db)
            .await?;
        Ok(stores)
    }

    async fn create_store(&self, name: &str) -> Result<Store> {
        let mut store = stores::ActiveModel::new();
        store.name = Set(name.to_owned());
        Ok(store.insert(&self.db).await?)
    }

    async fn delete_store(&self, id: Uuid) -> Result<()> {
        let deleted = stores::Entity::delete_by_id(id).exec(&self.db).await?;
        if deleted.rows_affected == 0 {
            return Err(LedgerError::NotFound(format!("store {id}")));
        }
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductWithStore>> {
        let rows = products::Entity::find()
            .find_also_related(stores::Entity)
            .order_by_desc(products::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(product, store)| ProductWithStore::new(product, store))
            .collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<ProductWithStore> {
        let (product, store) = products::Entity::find_by_id(id)
            .find_also_related(stores::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("product {id}")))?;
        Ok(ProductWithStore::new(product, store))
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let mut product = products::ActiveModel::new();
        product.name = Set(new.name);
        product.store_id = Set(new.store_id);
        product.purchase_price = Set(new.purchase_price);
        product.purchase_date = Set(new.purchase_date);
        product.sale_price = Set(new.sale_price);
        product.sale_date = Set(new.sale_date);
        product.sold_at = Set(new.sold_at);
        product.product_url = Set(new.product_url);
        Ok(product.insert(&self.db).await?)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product> {
        let mut product: products::ActiveModel = self.find_product(id).await?.into();
        if let Some(name) = patch.name {
            product.name = Set(name);
        }
        if let Some(store_id) = patch.store_id {
            product.store_id = Set(store_id);
        }
        if let Some(price) = patch.purchase_price {
            product.purchase_price = Set(price);
        }
        if let Some(date) = patch.purchase_date {
            product.purchase_date = Set(date);
        }
        if let Some(price) = patch.sale_price {
            product.sale_price = Set(price);
        }
        if let Some(date) = patch.sale_date {
            product.sale_date = Set(date);
        }
        if let Some(channel) = patch.sold_at {
            product.sold_at = Set(channel);
        }
        if let Some(url) = patch.product_url {
            product.product_url = Set(url);
        }
        Ok(product.update(&self.db).await?)
    }

    async fn delete_product(&self, id: Uuid) -> Result<()> {
        let deleted = products::Entity::delete_by_id(id).exec(&self.db).await?;
        if deleted.rows_affected == 0 {
            return Err(LedgerError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn list_products_sold_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Product>> {
        let products = products::Entity::find()
            .filter(products::Column::SaleDate.is_not_null())
            .filter(products::Column::SaleDate.gte(start))
            .filter(products::Column::SaleDate.lte(end))
            .all(&self.db)
            .await?;
        Ok(products)
    }
}
