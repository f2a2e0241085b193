//! Pricing rule model for pricing-service.

use crate::utils::{parse_decimal, parse_decimal_or_default};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing group label. Informational only; it never affects matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PricingGroup {
    #[default]
    Standard,
    Premium,
    Economy,
    Bulk,
}

impl PricingGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingGroup::Standard => "Standard",
            PricingGroup::Premium => "Premium",
            PricingGroup::Economy => "Economy",
            PricingGroup::Bulk => "Bulk",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s.trim() {
            "Premium" | "premium" => PricingGroup::Premium,
            "Economy" | "economy" => PricingGroup::Economy,
            "Bulk" | "bulk" => PricingGroup::Bulk,
            _ => PricingGroup::Standard,
        }
    }
}

/// Editable field of a [`PricingRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    FromPrice,
    ToPrice,
    MarkupPct,
    PricingGroup,
}

/// One tier of a markup schedule.
///
/// Bounds and markup are kept as the text the user typed and parsed on use:
/// `from_price` defaults to 0, `to_price` to +infinity, `markup_pct` to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: String,
    pub from_price: String,
    pub to_price: String,
    pub markup_pct: String,
    pub pricing_group: PricingGroup,
}

impl PricingRule {
    pub fn new(
        id: impl Into<String>,
        from_price: impl Into<String>,
        to_price: impl Into<String>,
        markup_pct: impl Into<String>,
        pricing_group: PricingGroup,
    ) -> Self {
        Self {
            id: id.into(),
            from_price: from_price.into(),
            to_price: to_price.into(),
            markup_pct: markup_pct.into(),
            pricing_group,
        }
    }

    /// A freshly added rule: every numeric field blank.
    pub fn blank(id: impl Into<String>) -> Self {
        Self::new(id, "", "", "", PricingGroup::Standard)
    }

    /// Inclusive lower bound on cost.
    pub fn lower_bound(&self) -> Decimal {
        parse_decimal_or_default(&self.from_price, Decimal::ZERO)
    }

    /// Exclusive upper bound on cost; `None` is unbounded.
    ///
    /// Only blank or non-numeric text is unbounded. A typed `"0"` is a real
    /// bound that makes the range empty; it deliberately does not mean
    /// "no limit", unlike the dashboard this pricing model came from.
    pub fn upper_bound(&self) -> Option<Decimal> {
        parse_decimal(&self.to_price)
    }

    /// Markup percent applied to cost.
    pub fn markup(&self) -> Decimal {
        parse_decimal_or_default(&self.markup_pct, Decimal::ZERO)
    }

    /// Whether `cost` falls in `[from_price, to_price)`.
    pub fn matches(&self, cost: Decimal) -> bool {
        cost >= self.lower_bound() && self.upper_bound().map_or(true, |to| cost < to)
    }

    /// Whether no cost can ever match (`from >= to`).
    pub fn is_empty_range(&self) -> bool {
        self.upper_bound()
            .is_some_and(|to| self.lower_bound() >= to)
    }

    /// Whether every cost this rule matches is also matched by `other`.
    pub fn is_covered_by(&self, other: &PricingRule) -> bool {
        let upper_covered = match (other.upper_bound(), self.upper_bound()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(outer), Some(inner)) => outer >= inner,
        };
        other.lower_bound() <= self.lower_bound() && upper_covered
    }

    /// Field-wise equality ignoring `id`.
    pub fn same_terms(&self, other: &PricingRule) -> bool {
        self.from_price == other.from_price
            && self.to_price == other.to_price
            && self.markup_pct == other.markup_pct
            && self.pricing_group == other.pricing_group
    }

    pub fn set_field(&mut self, field: RuleField, value: &str) {
        match field {
            RuleField::FromPrice => self.from_price = value.to_string(),
            RuleField::ToPrice => self.to_price = value.to_string(),
            RuleField::MarkupPct => self.markup_pct = value.to_string(),
            RuleField::PricingGroup => self.pricing_group = PricingGroup::from_string(value),
        }
    }
}

/// Built-in markup schedule used until a default is promoted.
pub fn default_rules() -> Vec<PricingRule> {
    vec![
        PricingRule::new("1", "0", "10", "45", PricingGroup::Standard),
        PricingRule::new("2", "10", "50", "35", PricingGroup::Standard),
        PricingRule::new("3", "50", "200", "25", PricingGroup::Standard),
        PricingRule::new("4", "200", "1000", "18", PricingGroup::Premium),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_group_label_round_trips() {
        for group in [
            PricingGroup::Standard,
            PricingGroup::Premium,
            PricingGroup::Economy,
            PricingGroup::Bulk,
        ] {
            assert_eq!(PricingGroup::from_string(group.as_str()), group);
        }
    }

    #[test]
    fn test_zero_upper_bound_is_not_unbounded() {
        let rule = PricingRule::new("z", "0", "0", "30", PricingGroup::Standard);
        assert_eq!(rule.upper_bound(), Some(Decimal::ZERO));
        assert!(rule.is_empty_range());
        assert!(!rule.matches(dec!(0)));
        assert!(!rule.matches(dec!(5000)));
    }

    #[test]
    fn test_range_is_half_open() {
        let rule = PricingRule::new("r", "10", "50", "35", PricingGroup::Standard);
        assert!(!rule.matches(dec!(9.99)));
        assert!(rule.matches(dec!(10)));
        assert!(rule.matches(dec!(49.99)));
        assert!(!rule.matches(dec!(50)));
    }

    #[test]
    fn test_blank_fields_use_defaults() {
        let rule = PricingRule::blank("r");
        assert_eq!(rule.lower_bound(), Decimal::ZERO);
        assert_eq!(rule.upper_bound(), None);
        assert_eq!(rule.markup(), Decimal::ZERO);
        assert!(rule.matches(dec!(0)));
        assert!(rule.matches(dec!(1000000)));
    }

    #[test]
    fn test_garbage_fields_use_defaults() {
        let rule = PricingRule::new("r", "abc", "n/a", "?", PricingGroup::Bulk);
        assert_eq!(rule.lower_bound(), Decimal::ZERO);
        assert_eq!(rule.upper_bound(), None);
        assert_eq!(rule.markup(), Decimal::ZERO);
    }

    #[test]
    fn test_explicit_zero_upper_bound_is_empty() {
        let rule = PricingRule::new("r", "0", "0", "10", PricingGroup::Standard);
        assert!(rule.is_empty_range());
        assert!(!rule.matches(dec!(0)));
    }

    #[test]
    fn test_coverage() {
        let wide = PricingRule::new("a", "0", "", "10", PricingGroup::Standard);
        let narrow = PricingRule::new("b", "10", "50", "20", PricingGroup::Standard);
        assert!(narrow.is_covered_by(&wide));
        assert!(!wide.is_covered_by(&narrow));
    }

    #[test]
    fn test_same_terms_ignores_id() {
        let a = PricingRule::new("1", "0", "10", "45", PricingGroup::Standard);
        let mut b = a.clone();
        b.id = "other".to_string();
        assert!(a.same_terms(&b));
        b.set_field(RuleField::MarkupPct, "50");
        assert!(!a.same_terms(&b));
    }

    #[test]
    fn test_pricing_group_from_string_falls_back_to_standard() {
        assert_eq!(PricingGroup::from_string("Premium"), PricingGroup::Premium);
        assert_eq!(PricingGroup::from_string("bulk"), PricingGroup::Bulk);
        assert_eq!(PricingGroup::from_string("Luxury"), PricingGroup::Standard);
    }

    #[test]
    fn test_seed_rules() {
        let rules = default_rules();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[3].pricing_group, PricingGroup::Premium);
        assert_eq!(rules[0].markup(), dec!(45));
    }
}
