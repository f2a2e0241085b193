//! HTTP handlers for pricing-service.
//!
//! Thin JSON adapters over [`crate::services::ScenarioController`].

pub mod lines;
pub mod scenario;

use crate::services::ScenarioError;
use service_core::error::AppError;

impl From<ScenarioError> for AppError {
    fn from(err: ScenarioError) -> Self {
        match err {
            err @ ScenarioError::ConfirmationRequired => {
                AppError::BadRequest(anyhow::Error::new(err))
            }
            ScenarioError::Repository(e) => AppError::StorageError(anyhow::Error::new(e)),
        }
    }
}
