//! Pricing Service - what-if markup simulation over invoice lines.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
