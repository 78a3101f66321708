pub mod analytics;
pub mod config;
pub mod entities;
mod error;
pub mod links;
mod models;
pub mod storage;
pub mod web;

#[cfg(test)]
mod testing;

pub use error::{LedgerError, Result, SETUP_HINT};
pub use models::{
    NewProduct, Product, ProductFilter, ProductPatch, ProductWithStore, SaleStatus, Store,
    UNKNOWN_STORE,
};

use analytics::{
    Dashboard, DateRange, ProductProfitability, ProfitStats, StoreStats, TimeRangeStats,
};
use chrono::NaiveDate;
use storage::LedgerStorage;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Number of lowest-profit entries reported on the dashboard.
const LEAST_PROFITABLE_SHOWN: usize = 3;

/// Bookkeeping service over an injected storage backend.
///
/// Every analytics query re-reads the store and recomputes from scratch; no
/// state is kept between calls.
pub struct Ledger<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> Ledger<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn list_stores(&self) -> Result<Vec<Store>> {
        self.storage.list_stores().await
    }

    #[instrument(skip(self))]
    pub async fn create_store(&self, name: &str) -> Result<Store> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("Store name required".to_string()));
        }
        let store = self.storage.create_store(name).await?;
        info!(store_id = %store.id, "store created");
        Ok(store)
    }

    #[instrument(skip(self))]
    pub async fn delete_store(&self, id: Uuid) -> Result<()> {
        self.storage.delete_store(id).await?;
        info!("store deleted");
        Ok(())
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductWithStore>> {
        let mut rows = self.storage.list_products().await?;
        rows.retain(|row| filter.matches(row));
        Ok(rows)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductWithStore> {
        self.storage.get_product(id).await
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        if product.name.trim().is_empty() {
            return Err(LedgerError::Validation("Product name required".to_string()));
        }
        let product = self.storage.create_product(product).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(LedgerError::Validation("Product name required".to_string()));
        }
        let product = self.storage.update_product(id, patch).await?;
        info!(sold = product.is_sold(), "product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<()> {
        self.storage.delete_product(id).await?;
        info!("product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn overall_stats(&self) -> Result<ProfitStats> {
        let rows = self.storage.list_products().await?;
        let stats = analytics::overall_stats(rows.iter().map(|row| &row.product));
        debug!(items = stats.total_items, "overall stats computed");
        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn time_range_stats(&self, range: DateRange) -> Result<TimeRangeStats> {
        let products = self
            .storage
            .list_products_sold_between(range.start, range.end)
            .await?;
        Ok(analytics::time_range_stats(&products, range))
    }

    #[instrument(skip(self))]
    pub async fn most_profitable(&self, limit: usize) -> Result<Vec<ProductProfitability>> {
        let rows = self.storage.list_products().await?;
        Ok(analytics::most_profitable(&rows, limit))
    }

    #[instrument(skip(self))]
    pub async fn store_stats(&self) -> Result<Vec<StoreStats>> {
        let rows = self.storage.list_products().await?;
        Ok(analytics::store_rollup(&rows))
    }

    /// Runs every dashboard query concurrently. Fails as a whole if any
    /// individual read fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, today: NaiveDate, top_limit: usize) -> Result<Dashboard> {
        let (stats, this_week, this_year, most_profitable, stores) = tokio::try_join!(
            self.overall_stats(),
            self.time_range_stats(DateRange::week_of(today)),
            self.time_range_stats(DateRange::year_of(today)),
            self.most_profitable(top_limit),
            self.store_stats(),
        )?;

        let mut least_profitable = most_profitable.clone();
        least_profitable.sort_by(|a, b| a.profit.cmp(&b.profit));
        least_profitable.truncate(LEAST_PROFITABLE_SHOWN);

        Ok(Dashboard {
            derived: stats.derived(),
            stats,
            this_week,
            this_year,
            most_profitable,
            least_profitable,
            stores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::unconfigured::UnconfiguredStorage;
    use crate::testing::{date, new_product};
    use anyhow::Result;
    use rust_decimal_macros::dec;

    async fn seeded() -> Result<(Ledger<MemoryStorage>, Store, Store)> {
        let ledger = Ledger::new(MemoryStorage::new());
        let store_a = ledger.create_store("Store A").await?;
        let store_b = ledger.create_store("Store B").await?;

        let mut sold_a = new_product(store_a.id, "Leather Bag", dec!(100));
        sold_a.sale_price = Some(dec!(150));
        sold_a.sale_date = Some(date("2025-06-10"));
        ledger.create_product(sold_a).await?;

        ledger
            .create_product(new_product(store_a.id, "Silk Scarf", dec!(50)))
            .await?;

        let mut sold_b = new_product(store_b.id, "Desk Lamp", dec!(30));
        sold_b.sale_price = Some(dec!(20));
        sold_b.sale_date = Some(date("2025-01-15"));
        ledger.create_product(sold_b).await?;

        Ok((ledger, store_a, store_b))
    }

    #[tokio::test]
    async fn test_analytics_queries() -> Result<()> {
        let (ledger, store_a, store_b) = seeded().await?;

        let stats = ledger.overall_stats().await?;
        assert_eq!(stats.total_profit, dec!(40));
        assert_eq!(stats.total_cost, dec!(180));

        let june = ledger
            .time_range_stats(DateRange::new(date("2025-06-01"), date("2025-06-30")))
            .await?;
        assert_eq!(june.items_sold, 1);
        assert_eq!(june.profit, dec!(50));

        let top = ledger.most_profitable(1).await?;
        assert_eq!(top[0].product_name, "Leather Bag");
        assert_eq!(top[0].store_name, "Store A");

        let stores = ledger.store_stats().await?;
        let order: Vec<_> = stores.iter().map(|s| (s.store.id, s.items, s.profit)).collect();
        assert_eq!(
            order,
            vec![(store_a.id, 2, dec!(50)), (store_b.id, 1, dec!(-10))]
        );
        let items: usize = stores.iter().map(|s| s.items).sum();
        assert_eq!(items, stats.total_items);
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard() -> Result<()> {
        let (ledger, _, _) = seeded().await?;

        // Wednesday; the week runs 2025-06-08..=2025-06-14.
        let dashboard = ledger.dashboard(date("2025-06-11"), 10).await?;
        assert_eq!(dashboard.this_week.items_sold, 1);
        assert_eq!(dashboard.this_year.items_sold, 2);
        assert_eq!(dashboard.this_year.profit, dec!(40));
        assert_eq!(dashboard.most_profitable.len(), 2);
        assert_eq!(dashboard.least_profitable[0].profit, dec!(-10));
        assert_eq!(dashboard.derived.inventory_value, dec!(60));
        assert_eq!(dashboard.stores.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_filtered_listing() -> Result<()> {
        let (ledger, _, _) = seeded().await?;

        let all = ledger.list_products(&ProductFilter::default()).await?;
        assert_eq!(all.len(), 3);

        let sold = ProductFilter {
            status: SaleStatus::Sold,
            q: Some("lamp".to_string()),
        };
        let rows = ledger.list_products(&sold).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product.name, "Desk Lamp");

        let unsold = ProductFilter {
            status: SaleStatus::Unsold,
            q: None,
        };
        let rows = ledger.list_products(&unsold).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product.name, "Silk Scarf");
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_names_rejected() -> Result<()> {
        let ledger = Ledger::new(MemoryStorage::new());
        let err = ledger.create_store("   ").await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let store = ledger.create_store(" Goodwill ").await?;
        assert_eq!(store.name, "Goodwill");

        let err = ledger
            .create_product(new_product(store.id, "", dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_every_query() {
        let ledger = Ledger::new(UnconfiguredStorage::new());
        assert!(ledger.overall_stats().await.unwrap_err().is_config_error());
        assert!(ledger
            .dashboard(date("2025-06-11"), 10)
            .await
            .unwrap_err()
            .is_config_error());
    }
}
