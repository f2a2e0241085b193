//! Common test utilities for pricing-service integration tests.
#![allow(dead_code)]

use pricing_service::config::{PricingConfig, RulesConfig};
use pricing_service::models::InvoiceLine;
use pricing_service::startup::Application;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use service_core::config::Config as CommonConfig;
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,pricing_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Spawn the application on a random port with in-memory default rules.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_rules(None).await
}

/// Spawn the application, persisting default rules at `rules_path` when given.
pub async fn spawn_app_with_rules(rules_path: Option<PathBuf>) -> TestApp {
    init_tracing();

    let config = PricingConfig {
        common: CommonConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        service_name: "pricing-service-test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        rules: RulesConfig { path: rules_path },
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    let port = app.http_port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let address = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP client");

    // Wait for server to be ready with retry
    let mut attempts = 0;
    loop {
        match client.get(format!("{}/health", address)).send().await {
            Ok(_) => break,
            Err(_) if attempts < 20 => {
                attempts += 1;
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Err(e) => panic!("Server not ready after 20 attempts: {}", e),
        }
    }

    TestApp { address, client }
}

/// An invoice line with a recorded shipment 5% above the current price.
pub fn line(id: &str, cost: Decimal, qty: i64) -> InvoiceLine {
    let now = cost * dec!(1.4);
    InvoiceLine {
        id: id.to_string(),
        part_code: format!("PC-{}", id),
        manufacturer: "Bosch".to_string(),
        part_name: "Oil filter".to_string(),
        qty,
        cost,
        now,
        ship: now * dec!(1.05),
        delta_percent: dec!(5.0),
        stock: 40,
        weight: dec!(0.6),
        product_group: "Filters".to_string(),
        sales_12m: 120,
    }
}

/// A line without an incoming shipment.
pub fn line_without_shipment(id: &str, cost: Decimal, qty: i64) -> InvoiceLine {
    InvoiceLine {
        ship: Decimal::ZERO,
        delta_percent: dec!(-100),
        ..line(id, cost, qty)
    }
}

/// One line per seed tier plus one above every tier.
pub fn sample_lines() -> Vec<InvoiceLine> {
    vec![
        line("1", dec!(5), 10),
        line("2", dec!(8.40), 4),
        line("3", dec!(25), 6),
        line_without_shipment("4", dec!(75), 2),
        line("5", dec!(500), 1),
        line("6", dec!(1500), 1),
    ]
}
