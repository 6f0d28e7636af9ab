//! # Proplens Analytics
//!
//! The property valuation and portfolio analytics layer: an automated
//! valuation model for single properties plus aggregate views over an
//! owner's holdings and over a market slice.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no shared mutable state. Inputs are
//!   `core_types::PropertyRecord`s; model constants come from
//!   `configuration::ValuationSettings`.
//! - **Explicit randomness:** the appreciation, price-growth and
//!   days-on-market figures carry market noise. It is always drawn from a
//!   caller-supplied `RandomSource`, so a seeded generator or `NoNoise`
//!   makes every result reproducible.
//! - **Defaults over errors:** missing fields take documented defaults. Only
//!   a malformed JSON root fails, with `AnalyticsError::InvalidInput`.
//!
//! ## Public API
//!
//! - `ValuationEngine`: values one property into `PropertyMetrics`.
//! - `PortfolioAnalyzer`: one owner's holdings into `OwnershipAnalysis`.
//! - `MarketAnalyzer`: a market slice into `MarketAnalysis`.
//! - `scoring`: the market, liquidity and risk scorers.
//! - `format`: currency and percentage display helpers.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod format;
pub mod market;
pub mod portfolio;
pub mod random;
pub mod report;
pub mod scoring;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::ValuationEngine;
pub use error::AnalyticsError;
pub use format::{format_currency, format_percentage};
pub use market::MarketAnalyzer;
pub use portfolio::PortfolioAnalyzer;
pub use random::{NoNoise, RandomSource, seeded, with_rng};
pub use report::{MarketAnalysis, MarketTrend, OwnershipAnalysis, PropertyMetrics};
