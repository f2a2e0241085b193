//! Shared helpers for pricing-service.

pub mod decimal;

pub use decimal::{parse_decimal, parse_decimal_or_default, round1, round2};
