use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::{
    AggregateSummary, InvoiceLine, PricingRule, RuleField, ScenarioStatus,
};
use crate::services::{ApplyOutcome, RuleWarning, ScenarioController};
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    pub status: ScenarioStatus,
    pub is_modified: bool,
    pub is_active: bool,
    pub summary: AggregateSummary,
    pub changed_rules: Vec<String>,
    pub modified_rows: Vec<String>,
    pub warnings: Vec<RuleWarning>,
}

impl From<&ScenarioController> for ScenarioResponse {
    fn from(c: &ScenarioController) -> Self {
        let state = c.state();
        Self {
            status: state.status(),
            is_modified: state.is_modified,
            is_active: state.is_active,
            summary: c.summary(),
            changed_rules: c.changed_rules().into_iter().map(String::from).collect(),
            modified_rows: c.modified_rows().into_iter().map(String::from).collect(),
            warnings: c.warnings(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RuleSetsResponse {
    pub scenario_rules: Vec<PricingRule>,
    pub default_rules: Vec<PricingRule>,
}

#[derive(Debug, Deserialize)]
pub struct EditRuleRequest {
    pub field: RuleField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub applied: bool,
    pub line_count: usize,
    pub scenario: ScenarioResponse,
}

impl ApplyResponse {
    fn new(outcome: ApplyOutcome, controller: &ScenarioController) -> Self {
        let (applied, line_count) = match outcome {
            ApplyOutcome::Applied(lines) => (true, lines.len()),
            ApplyOutcome::Skipped => (false, 0),
        };
        Self {
            applied,
            line_count,
            scenario: ScenarioResponse::from(controller),
        }
    }
}

pub async fn get_scenario(State(state): State<AppState>) -> Json<ScenarioResponse> {
    let controller = state.controller.lock().await;
    Json(ScenarioResponse::from(&*controller))
}

pub async fn get_preview(State(state): State<AppState>) -> Json<Vec<InvoiceLine>> {
    Json(state.controller.lock().await.preview().to_vec())
}

pub async fn get_rules(State(state): State<AppState>) -> Json<RuleSetsResponse> {
    let controller = state.controller.lock().await;
    Json(RuleSetsResponse {
        scenario_rules: controller.scenario_rules().to_vec(),
        default_rules: controller.default_rules().to_vec(),
    })
}

#[tracing::instrument(skip(state))]
pub async fn add_rule(State(state): State<AppState>) -> (StatusCode, Json<PricingRule>) {
    let rule = state.controller.lock().await.add_rule();
    (StatusCode::CREATED, Json(rule))
}

#[tracing::instrument(skip(state))]
pub async fn edit_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    Json(request): Json<EditRuleRequest>,
) -> Result<Json<ScenarioResponse>, AppError> {
    let mut controller = state.controller.lock().await;
    if !controller.edit_rule(&rule_id, request.field, &request.value) {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Rule not found: {}",
            rule_id
        )));
    }
    Ok(Json(ScenarioResponse::from(&*controller)))
}

#[tracing::instrument(skip(state))]
pub async fn remove_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.controller.lock().await.remove_rule(&rule_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!(
            "Rule not found: {}",
            rule_id
        )))
    }
}

#[tracing::instrument(skip(state))]
pub async fn apply(State(state): State<AppState>) -> Json<ApplyResponse> {
    let mut controller = state.controller.lock().await;
    let outcome = controller.apply();
    Json(ApplyResponse::new(outcome, &controller))
}

#[tracing::instrument(skip(state))]
pub async fn reset(State(state): State<AppState>) -> Json<ScenarioResponse> {
    let mut controller = state.controller.lock().await;
    controller.reset();
    Json(ScenarioResponse::from(&*controller))
}

#[tracing::instrument(skip(state))]
pub async fn promote(
    State(state): State<AppState>,
    Json(request): Json<PromoteRequest>,
) -> Result<Json<ApplyResponse>, AppError> {
    let mut controller = state.controller.lock().await;
    let outcome = controller.promote_to_default(request.confirm)?;
    Ok(Json(ApplyResponse::new(outcome, &controller)))
}
