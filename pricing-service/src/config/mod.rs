//! Configuration module for pricing-service.

use dotenvy::dotenv;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Default)]
pub struct RulesConfig {
    /// JSON file holding the default rules; in-memory when unset.
    pub path: Option<PathBuf>,
}

impl PricingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "pricing-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            rules: RulesConfig {
                path: env::var("RULES_PATH")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from),
            },
        })
    }
}
