//! Persistence of the default rule set.

use crate::models::{default_rules, PricingRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("rule store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for the default markup schedule.
///
/// Implementations hand back the built-in seed rules when nothing has been saved.
pub trait RuleRepository: Send {
    fn load(&self) -> Result<Vec<PricingRule>, RepositoryError>;

    fn save(&mut self, rules: &[PricingRule]) -> Result<(), RepositoryError>;
}

/// Session-local default rules.
#[derive(Debug, Clone)]
pub struct InMemoryRuleRepository {
    rules: Vec<PricingRule>,
}

impl InMemoryRuleRepository {
    pub fn new(rules: Vec<PricingRule>) -> Self {
        Self { rules }
    }
}

impl Default for InMemoryRuleRepository {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleRepository for InMemoryRuleRepository {
    fn load(&self) -> Result<Vec<PricingRule>, RepositoryError> {
        Ok(self.rules.clone())
    }

    fn save(&mut self, rules: &[PricingRule]) -> Result<(), RepositoryError> {
        self.rules = rules.to_vec();
        Ok(())
    }
}

/// On-disk layout of a saved rule set.
#[derive(Debug, Serialize, Deserialize)]
struct RuleDocument {
    rules: Vec<PricingRule>,
    saved_utc: DateTime<Utc>,
}

/// Default rules stored as a JSON document.
#[derive(Debug, Clone)]
pub struct FileRuleRepository {
    path: PathBuf,
}

impl FileRuleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RuleRepository for FileRuleRepository {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<PricingRule>, RepositoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved rules, using built-in schedule");
                return Ok(default_rules());
            }
            Err(e) => return Err(e.into()),
        };

        let document: RuleDocument = serde_json::from_slice(&bytes)?;
        info!(
            rule_count = document.rules.len(),
            saved_utc = %document.saved_utc,
            "Loaded default rules"
        );
        Ok(document.rules)
    }

    #[instrument(skip(self, rules), fields(path = %self.path.display(), rule_count = rules.len()))]
    fn save(&mut self, rules: &[PricingRule]) -> Result<(), RepositoryError> {
        let document = RuleDocument {
            rules: rules.to_vec(),
            saved_utc: Utc::now(),
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so readers never see a half-written file.
        let temp = self.temp_path();
        fs::write(&temp, bytes)?;
        fs::rename(&temp, &self.path)?;

        info!("Saved default rules");
        Ok(())
    }
}
