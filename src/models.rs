use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub use crate::entities::products::Model as Product;
pub use crate::entities::stores::Model as Store;

impl Product {
    /// A product counts as sold exactly when it carries a sale price.
    pub fn is_sold(&self) -> bool {
        self.sale_price.is_some()
    }

    /// `sale_price - purchase_price`, or `None` while unsold.
    pub fn profit(&self) -> Option<Decimal> {
        self.sale_price.map(|sale| sale.saturating_sub(self.purchase_price))
    }
}

/// A product joined with the store it references.
///
/// `store` is `None` when the reference did not resolve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductWithStore {
    #[serde(flatten)]
    pub product: Product,
    pub store: Option<Store>,
}

impl ProductWithStore {
    pub fn new(product: Product, store: Option<Store>) -> Self {
        Self { product, store }
    }

    pub fn store_name(&self) -> &str {
        self.store
            .as_ref()
            .map(|store| store.name.as_str())
            .unwrap_or(UNKNOWN_STORE)
    }
}

/// Name reported for a store reference that cannot be resolved.
pub const UNKNOWN_STORE: &str = "Unknown";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[default]
    All,
    Sold,
    Unsold,
}

/// Narrows a product listing by sale status and a search term.
///
/// The term matches case-insensitively against the product name, the store
/// name and the sales channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub status: SaleStatus,
    #[serde(default)]
    pub q: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, row: &ProductWithStore) -> bool {
        let status_ok = match self.status {
            SaleStatus::All => true,
            SaleStatus::Sold => row.product.is_sold(),
            SaleStatus::Unsold => !row.product.is_sold(),
        };
        if !status_ok {
            return false;
        }

        let Some(term) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        [
            Some(row.product.name.as_str()),
            Some(row.store_name()),
            row.product.sold_at.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Input for creating a product.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub store_id: Uuid,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub sale_date: Option<NaiveDate>,
    #[serde(default)]
    pub sold_at: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
}

/// Partial update of a product.
///
/// Nullable columns use `Option<Option<_>>`: an absent key leaves the value
/// alone, an explicit `null` clears it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub store_id: Option<Uuid>,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub sale_price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable")]
    pub sale_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub sold_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub product_url: Option<Option<String>>,
}

impl ProductPatch {
    /// Marks the product as sold.
    pub fn sold(price: Decimal, date: NaiveDate, channel: Option<&str>) -> Self {
        Self {
            sale_price: Some(Some(price)),
            sale_date: Some(Some(date)),
            sold_at: Some(channel.map(str::to_owned)),
            ..Self::default()
        }
    }

    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(store_id) = self.store_id {
            product.store_id = store_id;
        }
        if let Some(price) = self.purchase_price {
            product.purchase_price = price;
        }
        if let Some(date) = self.purchase_date {
            product.purchase_date = date;
        }
        if let Some(price) = self.sale_price {
            product.sale_price = price;
        }
        if let Some(date) = self.sale_date {
            product.sale_date = date;
        }
        if let Some(channel) = self.sold_at {
            product.sold_at = channel;
        }
        if let Some(url) = self.product_url {
            product.product_url = url;
        }
    }
}

fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
