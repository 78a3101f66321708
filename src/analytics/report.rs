use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Store;

/// All-time profit figures over every recorded product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitStats {
    /// Revenue minus the cost of the sold items only.
    pub total_profit: Decimal,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub profit_margin: Decimal,
    pub total_items: usize,
    pub sold_items: usize,
    pub unsold_items: usize,
}

impl ProfitStats {
    pub fn new() -> Self {
        Self {
            total_profit: Decimal::ZERO,
            total_revenue: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            profit_margin: Decimal::ZERO,
            total_items: 0,
            sold_items: 0,
            unsold_items: 0,
        }
    }

        pub fn derived(&self) -> DerivedMetrics {
        let average_cost = ratio(self.total_cost, Decimal::from(self.total_items));
        DerivedMetrics {
            avg_profit_per_item: ratio(self.total_profit, Decimal::from(self.sold_items)),
            sell_through_rate: percent(
                Decimal::from(self.sold_items),
                Decimal::from(self.total_items),
            ),
            roi: percent(self.total_profit, self.total_cost),
            inventory_value: Decimal::from(self.unsold_items).saturating_mul(average_cost),
        }
    }
}

impl Default for ProfitStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub avg_profit_per_item: Decimal,
    pub sell_through_rate: Decimal,
    pub roi: Decimal,
    pub inventory_value: Decimal,
}

/// Figures for items sold within a date range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeStats {
    pub profit: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub items_sold: usize,
}

impl TimeRangeStats {
    pub fn avg_profit_per_item(&self) -> Decimal {
        ratio(self.profit, Decimal::from(self.items_sold))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProfitability {
    pub product_id: Uuid,
    pub product_name: String,
    pub store_name: String,
    pub profit: Decimal,
    #[serde(rename = "profitMargin")]
    pub profit_margin: Decimal,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub store: Store,
    pub profit: Decimal,
    pub items: usize,
}

impl StoreStats {
    pub fn avg_profit_per_item(&self) -> Decimal {
        ratio(self.profit, Decimal::from(self.items))
    }
}

/// Everything the analytics screen renders, gathered in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: ProfitStats,
    pub derived: DerivedMetrics,
    pub this_week: TimeRangeStats,
    pub this_year: TimeRangeStats,
    pub most_profitable: Vec<ProductProfitability>,
    pub least_profitable: Vec<ProductProfitability>,
    pub stores: Vec<StoreStats>,
}

/// `part / whole`, or zero when `whole` is not positive. Quotients beyond
/// the decimal range saturate.
pub(crate) fn ratio(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole).unwrap_or(if part.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

pub(crate) fn percent(part: Decimal, whole: Decimal) -> Decimal {
    ratio(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
}
