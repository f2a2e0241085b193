//! Domain models for pricing-service.

mod invoice_line;
mod pricing_rule;
mod summary;

pub use invoice_line::{InvoiceLine, StoreRow, NO_SHIPMENT_DELTA, NO_SHIPMENT_PRICE};
pub use pricing_rule::{default_rules, PricingGroup, PricingRule, RuleField};
pub use summary::{AggregateSummary, ScenarioState, ScenarioStatus};
