//! service-core: config, errors, tracing and HTTP middleware shared by the pricing services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
