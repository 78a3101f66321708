//! Fixtures shared by unit tests.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{NewProduct, Product, ProductWithStore, Store};

pub fn store(name: &str) -> Store {
    Store {
        id: Uuid::new_v4(),
        name: name.to_string(),
        created_at: Utc::now(),
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn product(store: &Store, purchase: Decimal, sale: Option<Decimal>) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: format!("Item bought for {purchase}"),
        store_id: store.id,
        purchase_price: purchase,
        purchase_date: date("2025-01-10"),
        sale_price: sale,
        sale_date: sale.map(|_| date("2025-02-01")),
        sold_at: None,
        product_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sold_on(store: &Store, purchase: Decimal, sale: Decimal, sale_date: &str) -> Product {
    let mut item = product(store, purchase, Some(sale));
    item.sale_date = Some(date(sale_date));
    item
}

pub fn joined(product: Product, store: &Store) -> ProductWithStore {
    ProductWithStore::new(product, Some(store.clone()))
}

pub fn new_product(store_id: Uuid, name: &str, purchase: Decimal) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        store_id,
        purchase_price: purchase,
        purchase_date: date("2025-01-10"),
        sale_price: None,
        sale_date: None,
        sold_at: None,
        product_url: None,
    }
}
