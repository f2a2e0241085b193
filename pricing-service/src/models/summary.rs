//! Aggregate impact and scenario state models.

use super::InvoiceLine;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// Relationship between the working scenario and the persisted default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Scenario rules equal the defaults and nothing has been applied.
    Unmodified,
    /// Scenario rules differ from the defaults.
    ModifiedPreview,
    /// A scenario has been applied to the dataset and rules match the defaults.
    ScenarioActive,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Unmodified => "unmodified",
            ScenarioStatus::ModifiedPreview => "modified_preview",
            ScenarioStatus::ScenarioActive => "scenario_active",
        }
    }
}

/// Flags exposed to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioState {
    pub is_modified: bool,
    pub is_active: bool,
}

impl ScenarioState {
    pub fn status(&self) -> ScenarioStatus {
        if self.is_modified {
            ScenarioStatus::ModifiedPreview
        } else if self.is_active {
            ScenarioStatus::ScenarioActive
        } else {
            ScenarioStatus::Unmodified
        }
    }
}

/// Revenue and margin impact of the scenario against the base lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub original_total: Decimal,
    pub original_cost_total: Decimal,
    pub scenario_total: Decimal,
    /// Profit over original revenue, in percent.
    pub original_margin: Decimal,
    /// Profit over scenario revenue, in percent.
    pub scenario_margin: Decimal,
    pub difference: Decimal,
    pub rows_affected: usize,
    pub row_count: usize,
}

impl AggregateSummary {
    pub fn compute(base: &[InvoiceLine], preview: &[InvoiceLine], rows_affected: usize) -> Self {
        let original_total = total(base, InvoiceLine::sell_total);
        let original_cost_total = total(base, InvoiceLine::cost_total);
        let scenario_total = total(preview, InvoiceLine::sell_total);
        let difference = scenario_total
            .checked_sub(original_total)
            .unwrap_or_else(|| {
                warn!("Scenario difference out of decimal range, reported as zero");
                Decimal::ZERO
            });

        Self {
            original_total,
            original_cost_total,
            scenario_total,
            original_margin: margin(original_total, original_cost_total),
            scenario_margin: margin(scenario_total, original_cost_total),
            difference,
            rows_affected,
            row_count: base.len(),
        }
    }
}

/// Sum of `amount` over `lines`. A line whose amount, or whose addition to the
/// running sum, overflows is left out.
fn total(lines: &[InvoiceLine], amount: fn(&InvoiceLine) -> Option<Decimal>) -> Decimal {
    lines.iter().fold(Decimal::ZERO, |sum, line| {
        match amount(line).and_then(|value| sum.checked_add(value)) {
            Some(next) => next,
            None => {
                warn!(line_id = %line.id, "Line total out of decimal range, left out of summary");
                sum
            }
        }
    })
}

/// `(revenue - cost) / revenue * 100`, or zero without cost or revenue or on overflow.
fn margin(revenue: Decimal, cost: Decimal) -> Decimal {
    if cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    revenue
        .checked_sub(cost)
        .and_then(|profit| profit.checked_div(revenue))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}
