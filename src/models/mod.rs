//! Market data models
//!
//! This module contains the data types returned by the client operations:
//! - `series` - Date-indexed price tables (TimeSeries, Bar, Granularity)
//! - `fundamentals` - Company overview passthrough record (Fundamentals)

mod fundamentals;
mod series;

pub use fundamentals::Fundamentals;
pub use series::{Bar, Granularity, TimeSeries};
