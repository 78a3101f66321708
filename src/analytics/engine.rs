use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::period::DateRange;
use super::report::{percent, ProductProfitability, ProfitStats, StoreStats, TimeRangeStats};
use crate::models::{Product, ProductWithStore, Store, UNKNOWN_STORE};

pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// Headline figures over every product, sold or not.
///
/// Profit only counts the cost of sold items; unsold stock is part of
/// `total_cost` but never of `total_profit`.
pub fn overall_stats<'a>(products: impl IntoIterator<Item = &'a Product>) -> ProfitStats {
    let mut stats = ProfitStats::new();
    let mut sold_cost = Decimal::ZERO;

    for product in products {
        stats.total_items += 1;
        stats.total_cost = stats.total_cost.saturating_add(product.purchase_price);

        match product.sale_price {
            Some(sale) => {
                stats.sold_items += 1;
                stats.total_revenue = stats.total_revenue.saturating_add(sale);
                sold_cost = sold_cost.saturating_add(product.purchase_price);
            }
            None => stats.unsold_items += 1,
        }
    }

    stats.total_profit = stats.total_revenue.saturating_sub(sold_cost);
    stats.profit_margin = percent(stats.total_profit, stats.total_revenue);
    stats
}

/// Figures for products sold inside `range`.
///
/// A product needs both a sale date inside the range and a sale price; a
/// dated sale without a price is not counted.
pub fn time_range_stats<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    range: DateRange,
) -> TimeRangeStats {
    let mut stats = TimeRangeStats::default();

    for product in products {
        let Some(sale_date) = product.sale_date else {
            continue;
        };
        let Some(sale) = product.sale_price else {
            continue;
        };
        if !range.contains(sale_date) {
            continue;
        }
        stats.items_sold += 1;
        stats.cost = stats.cost.saturating_add(product.purchase_price);
        stats.revenue = stats.revenue.saturating_add(sale);
    }

    stats.profit = stats.revenue.saturating_sub(stats.cost);
    stats
}

/// Sold products ranked by absolute profit, highest first, at most `limit`.
pub fn most_profitable(products: &[ProductWithStore], limit: usize) -> Vec<ProductProfitability> {
    let mut ranked: Vec<ProductProfitability> = products
        .iter()
        .filter_map(|row| {
            let sale = row.product.sale_price?;
            let profit = sale.saturating_sub(row.product.purchase_price);
            Some(ProductProfitability {
                product_id: row.product.id,
                product_name: row.product.name.clone(),
                store_name: row.store_name().to_string(),
                profit,
                profit_margin: percent(profit, sale),
                purchase_price: row.product.purchase_price,
                sale_price: sale,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.profit.cmp(&a.profit));
    ranked.truncate(limit);
    ranked
}

/// Item count and realised profit per store, highest profit first.
///
/// Only stores referenced by at least one product appear. Products whose
/// store did not resolve are grouped under an "Unknown" placeholder so the
/// item counts still add up to the inventory size.
pub fn store_rollup(products: &[ProductWithStore]) -> Vec<StoreStats> {
    let mut slots: HashMap<Uuid, usize> = HashMap::new();
    let mut rollup: Vec<StoreStats> = Vec::new();

    for row in products {
        let store_id = row.product.store_id;
        let slot = *slots.entry(store_id).or_insert_with(|| {
            rollup.push(StoreStats {
                store: row.store.clone().unwrap_or_else(|| unknown_store(store_id)),
                profit: Decimal::ZERO,
                items: 0,
            });
            rollup.len() - 1
        });

        let entry = &mut rollup[slot];
        entry.items += 1;
        if let Some(profit) = row.product.profit() {
            entry.profit = entry.profit.saturating_add(profit);
        }
    }

    rollup.sort_by(|a, b| b.profit.cmp(&a.profit));
    rollup
}

fn unknown_store(id: Uuid) -> Store {
    Store {
        id,
        name: UNKNOWN_STORE.to_string(),
        created_at: Default::default(),
    }
}
