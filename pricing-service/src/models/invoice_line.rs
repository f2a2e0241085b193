//! Invoice line model for pricing-service.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `ship` value meaning "no incoming shipment".
pub const NO_SHIPMENT_PRICE: Decimal = Decimal::ZERO;

/// `delta_percent` value paired with [`NO_SHIPMENT_PRICE`]: the delta is undefined.
pub const NO_SHIPMENT_DELTA: Decimal = Decimal::from_parts(100, 0, 0, true, 0);

/// One purchasable part line on an invoice.
///
/// Lines are never mutated in place by pricing; recomputation produces a new line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: String,
    pub part_code: String,
    pub manufacturer: String,
    pub part_name: String,
    pub qty: i64,
    /// Unit purchase cost.
    pub cost: Decimal,
    /// Current sell price.
    pub now: Decimal,
    /// Incoming shipment price, or [`NO_SHIPMENT_PRICE`].
    pub ship: Decimal,
    /// Percent change from `now` to `ship`, or [`NO_SHIPMENT_DELTA`].
    pub delta_percent: Decimal,
    pub stock: i64,
    pub weight: Decimal,
    pub product_group: String,
    pub sales_12m: i64,
}

impl InvoiceLine {
    /// Whether an incoming shipment price is recorded.
    pub fn has_shipment(&self) -> bool {
        self.ship != NO_SHIPMENT_PRICE
    }

    /// Revenue at the current sell price; `None` when it overflows.
    pub fn sell_total(&self) -> Option<Decimal> {
        self.now.checked_mul(Decimal::from(self.qty))
    }

    /// Purchase cost of the whole line; `None` when it overflows.
    pub fn cost_total(&self) -> Option<Decimal> {
        self.cost.checked_mul(Decimal::from(self.qty))
    }

    /// Build a line from a raw store record. `index` is the record's position
    /// in the batch and supplies the id when the record has none.
    pub fn from_store_row(row: StoreRow, index: usize) -> Self {
        let id = match row.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => (index + 1).to_string(),
        };

        Self {
            id,
            part_code: row.part_code.unwrap_or_default(),
            manufacturer: row.manufacturer.unwrap_or_default(),
            part_name: row.part_name.unwrap_or_default(),
            qty: count(row.qty),
            cost: row.cost.unwrap_or_default(),
            now: row.now.unwrap_or_default(),
            ship: row.ship.unwrap_or_default(),
            delta_percent: row.delta_percent.unwrap_or_default(),
            stock: count(row.stock),
            weight: row.weight.unwrap_or_default(),
            product_group: row.product_group.unwrap_or_default(),
            sales_12m: count(row.sales_12m),
        }
    }

    /// Convert a whole batch of store records, preserving order.
    pub fn from_store_rows(rows: Vec<StoreRow>) -> Vec<Self> {
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| Self::from_store_row(row, index))
            .collect()
    }
}

fn count(value: Option<Decimal>) -> i64 {
    value.and_then(|v| v.trunc().to_i64()).unwrap_or(0)
}

/// Raw invoice row as returned by the invoice store or the enrichment webhook.
///
/// Both the store's snake_case columns and the dashboard's camelCase keys are
/// accepted; every field may be missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreRow {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, alias = "partCode")]
    pub part_code: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default, alias = "partName")]
    pub part_name: Option<String>,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default, alias = "price_now")]
    pub now: Option<Decimal>,
    #[serde(default, alias = "price_ship")]
    pub ship: Option<Decimal>,
    #[serde(default, alias = "deltaPercent")]
    pub delta_percent: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<Decimal>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default, alias = "productGroup")]
    pub product_group: Option<String>,
    #[serde(default, alias = "sales12m")]
    pub sales_12m: Option<Decimal>,
}
