//! Error types for market_snapshot
//!
//! This module defines the domain-specific errors raised while loading the
//! market fixture, wiring the dashboard surfaces and rendering a period.

use crate::market::Period;
use thiserror::Error;

/// Errors raised by the dashboard core.
///
/// `Lookup` and `Setup` are the two failure modes of the render pipeline,
/// the rest come from loading a user supplied fixture file.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No market data for period '{0}'")]
    Lookup(Period),

    #[error("Dashboard setup failed: {0}")]
    Setup(String),

    #[error("Invalid market data: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("Could not read market data file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
