//! Tiered markup engine.
//!
//! Maps a unit cost to a markup through an ordered rule list (first match
//! wins) and derives the sell price, shipment price and delta from it.

use crate::models::{InvoiceLine, PricingRule, NO_SHIPMENT_DELTA, NO_SHIPMENT_PRICE};
use crate::utils::{round1, round2};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// Premium of an incoming shipment over the recomputed sell price (5.5%).
pub const SHIPMENT_PREMIUM: Decimal = Decimal::from_parts(1055, 0, 0, false, 3);

/// First rule, in list order, whose `[from, to)` range contains `cost`.
pub fn find_matching_rule(cost: Decimal, rules: &[PricingRule]) -> Option<&PricingRule> {
    rules.iter().find(|rule| rule.matches(cost))
}

/// Reprice one line from its cost. Lines no rule matches are returned unchanged.
///
/// The sell price is always derived from `cost`, never from the previous
/// `now`, so repricing is idempotent.
pub fn recompute_line(line: &InvoiceLine, rules: &[PricingRule]) -> InvoiceLine {
    let Some(rule) = find_matching_rule(line.cost, rules) else {
        return line.clone();
    };

    let repriced = rule
        .markup()
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|m| Decimal::ONE.checked_add(m))
        .and_then(|factor| line.cost.checked_mul(factor))
        .map(round2)
        .and_then(|now| now.checked_mul(SHIPMENT_PREMIUM).map(|ship| (now, round2(ship))));
    let Some((now, ship)) = repriced else {
        warn!(
            line_id = %line.id,
            rule_id = %rule.id,
            "Markup out of decimal range, line left unchanged"
        );
        return line.clone();
    };

    let (ship, delta_percent) = if line.has_shipment() {
        if ship == NO_SHIPMENT_PRICE {
            // A price that rounds to zero reads as "no shipment"; keep the sentinel pair.
            (NO_SHIPMENT_PRICE, NO_SHIPMENT_DELTA)
        } else if ship > Decimal::ZERO && now > Decimal::ZERO {
            (ship, round1((ship - now) / now * Decimal::ONE_HUNDRED))
        } else {
            (ship, Decimal::ZERO)
        }
    } else {
        (NO_SHIPMENT_PRICE, NO_SHIPMENT_DELTA)
    };

    InvoiceLine {
        now,
        ship,
        delta_percent,
        ..line.clone()
    }
}

/// Reprice every line, preserving order.
pub fn apply_rule_set(lines: &[InvoiceLine], rules: &[PricingRule]) -> Vec<InvoiceLine> {
    lines.iter().map(|line| recompute_line(line, rules)).collect()
}

/// Why a rule can never take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleWarning {
    /// `from >= to`: the range is empty.
    EmptyRange { rule_id: String },
    /// An earlier rule covers the whole range.
    Shadowed { rule_id: String, shadowed_by: String },
}

/// Rules that can never match any cost, in list order.
pub fn find_shadowed_rules(rules: &[PricingRule]) -> Vec<RuleWarning> {
    rules
        .iter()
        .enumerate()
        .filter_map(|(index, rule)| {
            if rule.is_empty_range() {
                return Some(RuleWarning::EmptyRange {
                    rule_id: rule.id.clone(),
                });
            }
            rules[..index]
                .iter()
                .find(|earlier| !earlier.is_empty_range() && rule.is_covered_by(earlier))
                .map(|earlier| RuleWarning::Shadowed {
                    rule_id: rule.id.clone(),
                    shadowed_by: earlier.id.clone(),
                })
        })
        .collect()
}
