//! What-if scenario controller.
//!
//! Owns the persisted default rule set and the working scenario rule set,
//! keeps a live preview of the base lines repriced under the scenario, and
//! exposes apply / reset / promote to the view layer.

use crate::models::{
    AggregateSummary, InvoiceLine, PricingRule, RuleField, ScenarioState, ScenarioStatus,
};
use crate::services::metrics::{
    BASE_LINES, PREVIEW_DURATION, RULE_EDITS_TOTAL, SCENARIO_ACTIONS_TOTAL,
};
use crate::services::repository::{RepositoryError, RuleRepository};
use crate::services::rule_engine::{apply_rule_set, find_matching_rule, find_shadowed_rules, RuleWarning};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("promoting a scenario overwrites the default rules and must be confirmed")]
    ConfirmationRequired,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of a commit request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The preview became the active dataset; carries the committed lines.
    Applied(Vec<InvoiceLine>),
    /// Nothing modified and nothing active: state left untouched.
    Skipped,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied(_))
    }
}

/// One controller per view session.
pub struct ScenarioController {
    repository: Box<dyn RuleRepository>,
    base_lines: Vec<InvoiceLine>,
    default_rules: Vec<PricingRule>,
    scenario_rules: Vec<PricingRule>,
    preview_lines: Vec<InvoiceLine>,
    applied_lines: Option<Vec<InvoiceLine>>,
}

impl ScenarioController {
    /// Load the default rules from `repository` and start Unmodified.
    #[instrument(skip_all, fields(line_count = base_lines.len()))]
    pub fn new(
        repository: Box<dyn RuleRepository>,
        base_lines: Vec<InvoiceLine>,
    ) -> Result<Self, RepositoryError> {
        let default_rules = repository.load()?;
        info!(rule_count = default_rules.len(), "Scenario controller ready");

        let mut controller = Self {
            repository,
            base_lines,
            scenario_rules: default_rules.clone(),
            default_rules,
            preview_lines: Vec::new(),
            applied_lines: None,
        };
        controller.refresh();
        Ok(controller)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn base_lines(&self) -> &[InvoiceLine] {
        &self.base_lines
    }

    pub fn default_rules(&self) -> &[PricingRule] {
        &self.default_rules
    }

    pub fn scenario_rules(&self) -> &[PricingRule] {
        &self.scenario_rules
    }

    /// Base lines repriced under the scenario rules.
    pub fn preview(&self) -> &[InvoiceLine] {
        &self.preview_lines
    }

    /// Dataset the view shows: the applied scenario if any, else the base lines.
    pub fn active_lines(&self) -> &[InvoiceLine] {
        self.applied_lines.as_deref().unwrap_or(&self.base_lines)
    }

    pub fn is_modified(&self) -> bool {
        !rules_equal(&self.scenario_rules, &self.default_rules)
    }

    pub fn is_active(&self) -> bool {
        self.applied_lines.is_some()
    }

    pub fn state(&self) -> ScenarioState {
        ScenarioState {
            is_modified: self.is_modified(),
            is_active: self.is_active(),
        }
    }

    pub fn status(&self) -> ScenarioStatus {
        self.state().status()
    }

    pub fn summary(&self) -> AggregateSummary {
        AggregateSummary::compute(
            &self.base_lines,
            &self.preview_lines,
            self.modified_rows().len(),
        )
    }

    /// Ids of base lines whose effective markup differs between default and scenario.
    pub fn modified_rows(&self) -> Vec<&str> {
        self.base_lines
            .iter()
            .filter(|line| self.is_row_modified(line))
            .map(|line| line.id.as_str())
            .collect()
    }

    fn is_row_modified(&self, line: &InvoiceLine) -> bool {
        match (
            find_matching_rule(line.cost, &self.default_rules),
            find_matching_rule(line.cost, &self.scenario_rules),
        ) {
            (None, None) => false,
            (Some(default), Some(scenario)) => default.markup() != scenario.markup(),
            _ => true,
        }
    }

    /// Ids of scenario rules that are new or differ from the default rule with the same id.
    pub fn changed_rules(&self) -> Vec<&str> {
        self.scenario_rules
            .iter()
            .filter(|rule| {
                self.default_rules
                    .iter()
                    .find(|d| d.id == rule.id)
                    .map_or(true, |d| !d.same_terms(rule))
            })
            .map(|rule| rule.id.as_str())
            .collect()
    }

    /// Scenario rules that can never match.
    pub fn warnings(&self) -> Vec<RuleWarning> {
        find_shadowed_rules(&self.scenario_rules)
    }

    // -------------------------------------------------------------------------
    // Rule edits (scenario only)
    // -------------------------------------------------------------------------

    /// Set one field of a scenario rule. Returns `false` if no rule has `id`.
    #[instrument(skip(self))]
    pub fn edit_rule(&mut self, id: &str, field: RuleField, value: &str) -> bool {
        let Some(rule) = self.scenario_rules.iter_mut().find(|r| r.id == id) else {
            debug!("Edit ignored, rule not found");
            return false;
        };
        rule.set_field(field, value);
        let pricing_group = rule.pricing_group.as_str();
        RULE_EDITS_TOTAL.with_label_values(&["edit"]).inc();
        self.refresh();
        debug!(
            pricing_group,
            status = self.status().as_str(),
            "Scenario rule edited"
        );
        true
    }

    /// Append a blank rule and return it.
    #[instrument(skip(self))]
    pub fn add_rule(&mut self) -> PricingRule {
        let rule = PricingRule::blank(Uuid::new_v4().to_string());
        self.scenario_rules.push(rule.clone());
        RULE_EDITS_TOTAL.with_label_values(&["add"]).inc();
        self.refresh();
        debug!(rule_id = %rule.id, "Scenario rule added");
        rule
    }

    /// Remove a scenario rule. Returns `false` if no rule has `id`.
    #[instrument(skip(self))]
    pub fn remove_rule(&mut self, id: &str) -> bool {
        let before = self.scenario_rules.len();
        self.scenario_rules.retain(|r| r.id != id);
        if self.scenario_rules.len() == before {
            debug!("Remove ignored, rule not found");
            return false;
        }
        RULE_EDITS_TOTAL.with_label_values(&["remove"]).inc();
        self.refresh();
        debug!(status = self.status().as_str(), "Scenario rule removed");
        true
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Replace the base lines, e.g. after loading another invoice.
    /// Any applied scenario is dropped; both rule sets are kept.
    #[instrument(skip_all, fields(line_count = lines.len()))]
    pub fn load_base_lines(&mut self, lines: Vec<InvoiceLine>) {
        self.base_lines = lines;
        self.applied_lines = None;
        self.refresh();
        info!("Base lines loaded");
    }

    /// Commit the preview as the active dataset.
    #[instrument(skip(self))]
    pub fn apply(&mut self) -> ApplyOutcome {
        if !self.is_modified() && !self.is_active() {
            SCENARIO_ACTIONS_TOTAL
                .with_label_values(&["apply", "skipped"])
                .inc();
            debug!("Apply skipped, scenario unmodified and inactive");
            return ApplyOutcome::Skipped;
        }
        SCENARIO_ACTIONS_TOTAL
            .with_label_values(&["apply", "applied"])
            .inc();
        self.commit_preview()
    }

    /// Restore the scenario to the defaults and drop any applied scenario.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.scenario_rules = self.default_rules.clone();
        self.applied_lines = None;
        self.refresh();
        SCENARIO_ACTIONS_TOTAL
            .with_label_values(&["reset", "applied"])
            .inc();
        info!("Scenario reset to default rules");
    }

    /// Make the scenario the new default schedule and apply it.
    ///
    /// The new defaults are saved before any in-memory state changes, so a
    /// failed save leaves the controller as it was.
    #[instrument(skip(self))]
    pub fn promote_to_default(&mut self, confirmed: bool) -> Result<ApplyOutcome, ScenarioError> {
        if !confirmed {
            SCENARIO_ACTIONS_TOTAL
                .with_label_values(&["promote", "rejected"])
                .inc();
            warn!("Promotion requested without confirmation");
            return Err(ScenarioError::ConfirmationRequired);
        }
        if !self.is_modified() && !self.is_active() {
            SCENARIO_ACTIONS_TOTAL
                .with_label_values(&["promote", "skipped"])
                .inc();
            debug!("Promotion skipped, scenario unmodified and inactive");
            return Ok(ApplyOutcome::Skipped);
        }

        if let Err(e) = self.repository.save(&self.scenario_rules) {
            SCENARIO_ACTIONS_TOTAL
                .with_label_values(&["promote", "failed"])
                .inc();
            return Err(e.into());
        }
        self.default_rules = self.scenario_rules.clone();
        SCENARIO_ACTIONS_TOTAL
            .with_label_values(&["promote", "applied"])
            .inc();
        info!(
            rule_count = self.default_rules.len(),
            "Scenario promoted to default rules"
        );
        Ok(self.commit_preview())
    }

    fn commit_preview(&mut self) -> ApplyOutcome {
        let lines = self.preview_lines.clone();
        self.applied_lines = Some(lines.clone());
        info!(
            line_count = lines.len(),
            status = self.status().as_str(),
            "Scenario applied"
        );
        ApplyOutcome::Applied(lines)
    }

    fn refresh(&mut self) {
        let timer = PREVIEW_DURATION.start_timer();
        self.preview_lines = apply_rule_set(&self.base_lines, &self.scenario_rules);
        timer.observe_duration();
        BASE_LINES.set(self.base_lines.len() as i64);
    }
}

/// Same length and, position by position, the same four rule terms.
fn rules_equal(a: &[PricingRule], b: &[PricingRule]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_terms(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_rules;
    use crate::services::repository::InMemoryRuleRepository;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn line(id: &str, cost: Decimal) -> InvoiceLine {
        InvoiceLine {
            id: id.to_string(),
            part_code: format!("P-{}", id),
            manufacturer: "Bosch".to_string(),
            part_name: "Part".to_string(),
            qty: 2,
            cost,
            now: cost * dec!(2),
            ship: cost * dec!(2.1),
            delta_percent: dec!(5),
            stock: 1,
            weight: dec!(1),
            product_group: "Filters".to_string(),
            sales_12m: 10,
        }
    }

    fn controller() -> ScenarioController {
        ScenarioController::new(
            Box::new(InMemoryRuleRepository::default()),
            vec![line("1", dec!(5)), line("2", dec!(25)), line("3", dec!(1500))],
        )
        .unwrap()
    }

    struct FailingRepository;

    impl RuleRepository for FailingRepository {
        fn load(&self) -> Result<Vec<PricingRule>, RepositoryError> {
            Ok(default_rules())
        }

        fn save(&mut self, _rules: &[PricingRule]) -> Result<(), RepositoryError> {
            Err(std::io::Error::other("read-only store").into())
        }
    }

    #[test]
    fn test_starts_unmodified() {
        let c = controller();
        assert_eq!(c.status(), ScenarioStatus::Unmodified);
        assert_eq!(c.scenario_rules(), c.default_rules());
        assert_eq!(c.summary().rows_affected, 0);
    }

    #[test]
    fn test_edit_marks_modified_and_reverting_clears_it() {
        let mut c = controller();
        assert!(c.edit_rule("1", RuleField::MarkupPct, "50"));
        assert!(c.is_modified());
        assert!(c.edit_rule("1", RuleField::MarkupPct, "45"));
        assert!(!c.is_modified());
    }

    #[test]
    fn test_edit_unknown_rule_is_noop() {
        let mut c = controller();
        assert!(!c.edit_rule("missing", RuleField::MarkupPct, "99"));
        assert!(!c.remove_rule("missing"));
        assert_eq!(c.status(), ScenarioStatus::Unmodified);
    }

    #[test]
    fn test_apply_guard_skips_when_unmodified_and_inactive() {
        let mut c = controller();
        assert_eq!(c.apply(), ApplyOutcome::Skipped);
        assert!(!c.is_active());
    }

    #[test]
    fn test_apply_then_reset() {
        let mut c = controller();
        c.edit_rule("1", RuleField::MarkupPct, "50");
        let outcome = c.apply();
        assert!(outcome.is_applied());
        assert!(c.is_active());
        assert_eq!(c.active_lines()[0].now, dec!(7.50));

        c.reset();
        assert_eq!(c.status(), ScenarioStatus::Unmodified);
        assert_eq!(c.active_lines(), c.base_lines());
    }

    #[test]
    fn test_active_survives_rules_returning_to_default() {
        let mut c = controller();
        c.edit_rule("1", RuleField::MarkupPct, "50");
        c.apply();
        c.edit_rule("1", RuleField::MarkupPct, "45");
        assert_eq!(c.status(), ScenarioStatus::ScenarioActive);
        // Re-applying while active is allowed.
        assert!(c.apply().is_applied());
    }

    #[test]
    fn test_promote_requires_confirmation() {
        let mut c = controller();
        c.edit_rule("1", RuleField::MarkupPct, "50");
        assert!(matches!(
            c.promote_to_default(false),
            Err(ScenarioError::ConfirmationRequired)
        ));
        assert!(c.is_modified());
        assert!(!c.is_active());
    }

    #[test]
    fn test_promote_updates_defaults_and_applies() {
        let mut c = controller();
        c.edit_rule("1", RuleField::MarkupPct, "50");
        let outcome = c.promote_to_default(true).unwrap();
        assert!(outcome.is_applied());
        assert!(!c.is_modified());
        assert!(c.is_active());
        assert_eq!(c.default_rules()[0].markup_pct, "50");
    }

    #[test]
    fn test_failed_save_leaves_state_untouched() {
        let mut c = ScenarioController::new(Box::new(FailingRepository), vec![line("1", dec!(5))])
            .unwrap();
        c.edit_rule("1", RuleField::MarkupPct, "50");
        assert!(matches!(
            c.promote_to_default(true),
            Err(ScenarioError::Repository(_))
        ));
        assert!(c.is_modified());
        assert!(!c.is_active());
        assert_eq!(c.default_rules()[0].markup_pct, "45");
    }

    #[test]
    fn test_huge_markup_keeps_summary_available() {
        let mut c = ScenarioController::new(
            Box::new(InMemoryRuleRepository::default()),
            vec![InvoiceLine {
                qty: 1000,
                ..line("1", dec!(500))
            }],
        )
        .unwrap();
        assert!(c.edit_rule("4", RuleField::MarkupPct, "1e26"));

        let summary = c.summary();
        assert_eq!(summary.original_total, dec!(1000000));
        assert_eq!(summary.scenario_total, Decimal::ZERO);
        assert_eq!(summary.scenario_margin, Decimal::ZERO);
        assert_eq!(summary.rows_affected, 1);
        assert!(c.apply().is_applied());
    }

    #[test]
    fn test_loading_lines_drops_applied_scenario() {
        let mut c = controller();
        c.edit_rule("2", RuleField::MarkupPct, "40");
        c.apply();
        c.load_base_lines(vec![line("9", dec!(30))]);
        assert!(!c.is_active());
        assert!(c.is_modified());
        assert_eq!(c.preview()[0].now, dec!(42.00));
    }

    #[test]
    fn test_changed_rules_flags_new_and_edited() {
        let mut c = controller();
        c.edit_rule("3", RuleField::ToPrice, "250");
        let added = c.add_rule();
        assert_eq!(c.changed_rules(), vec!["3", added.id.as_str()]);
    }

    #[test]
    fn test_added_blank_rule_only_catches_gaps() {
        let mut c = controller();
        c.add_rule();
        assert!(c.is_modified());
        // Cost 1500 falls outside the seed tiers and now hits the blank 0% rule.
        assert_eq!(c.preview()[2].now, dec!(1500));
        assert_eq!(c.modified_rows(), vec!["3"]);
    }
}
