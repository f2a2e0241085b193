//! Services module for pricing-service.

pub mod metrics;
pub mod repository;
pub mod rule_engine;
pub mod scenario;

pub use metrics::{get_metrics, init_metrics};
pub use repository::{FileRuleRepository, InMemoryRuleRepository, RepositoryError, RuleRepository};
pub use rule_engine::{
    apply_rule_set, find_matching_rule, find_shadowed_rules, recompute_line, RuleWarning,
};
pub use scenario::{ApplyOutcome, ScenarioController, ScenarioError};
