//! Alpha Vantage market data client.
//!
//! This crate fetches financial market data from the Alpha Vantage HTTP API
//! and reshapes the raw CSV/JSON responses into clean, date-indexed tables:
//!
//! - adjusted daily or monthly price history, clipped to a caller-supplied
//!   date window whose boundaries are resolved to actual trading-day or
//!   month-end labels;
//! - company overview fundamentals, passed through unmodified;
//! - the 5-year treasury yield as a risk-free rate fraction.
//!
//! All operations are synchronous and blocking; each performs exactly one
//! HTTP round trip and either returns the fully resolved result or fails
//! with a [`MarketDataError`]. Nothing is cached.
//!
//! # Example
//!
//! ```no_run
//! use alphafeed::{Granularity, Stock};
//!
//! alphafeed::set_global_key("my-api-key");
//!
//! let aapl = Stock::new("AAPL");
//! let table = aapl.history("2023-01-01", "2023-06-30", Granularity::Daily)?;
//! println!("{} trading days", table.len());
//!
//! let overview = aapl.info()?;
//! let rf = alphafeed::risk_free_rate(None)?;
//! # Ok::<(), alphafeed::MarketDataError>(())
//! ```
//!
//! # Core types
//!
//! - [`Stock`] - client bound to one symbol and one credential
//! - [`TimeSeries`] / [`Bar`] - date-indexed adjusted OHLCV table
//! - [`Granularity`] - daily or monthly sampling
//! - [`Fundamentals`] - overview record as the provider reported it
//! - [`MarketDataError`] - the closed error taxonomy

pub mod client;
pub mod errors;
mod keys;
pub mod models;
mod treasury;

pub use client::Stock;
pub use errors::MarketDataError;
pub use keys::set_global_key;
pub use models::{Bar, Fundamentals, Granularity, TimeSeries};
pub use treasury::{risk_free_rate, risk_free_rate_at};
