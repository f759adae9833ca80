//! Date-window resolution against a fetched series.
//!
//! The provider only has rows for days the market traded (daily) or for
//! month-end dates (monthly), so the caller's boundaries rarely exist as row
//! labels verbatim. Daily boundaries are walked to actual labels (`start`
//! forward, `end` backward) under a shared bound on adjustment attempts;
//! monthly boundaries are matched by year-month against the month-end labels.
//! The walk iterates over candidate dates, never over the network.

use chrono::{Days, NaiveDate};
use log::error;

use crate::errors::MarketDataError;
use crate::models::TimeSeries;

/// Adjustment attempts across both boundaries before giving up.
const MAX_ADJUSTMENTS: u32 = 10;

/// Resolve a daily window to row labels and return the inclusive slice in
/// ascending date order.
///
/// The end boundary is advanced one day up front. Each pass then checks
/// `start` first: a missing `start` label advances it a day, a missing `end`
/// label retracts it a day, and each adjustment draws on the shared
/// [`MAX_ADJUSTMENTS`] budget. Exhausting the budget means the window lies
/// outside the available history or is malformed.
pub(crate) fn resolve_daily(
    symbol: &str,
    series: &TimeSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<TimeSeries, MarketDataError> {
    let requested = (start, end);
    let mut start = start;
    let mut end = end + Days::new(1);

    for _ in 0..MAX_ADJUSTMENTS {
        let Some(start_pos) = series.position(start) else {
            // Non-trading day (weekend, holiday) or before the first record.
            start = start + Days::new(1);
            continue;
        };
        let Some(end_pos) = series.position(end) else {
            end = end - Days::new(1);
            continue;
        };
        // Storage is newest-first: the end label sits at the smaller position.
        return Ok(series.slice_ascending(end_pos, start_pos));
    }

    Err(resolution_error(symbol, requested.0, requested.1))
}

/// Resolve a monthly window and return the inclusive slice in ascending date
/// order.
///
/// Each boundary resolves independently to the first row whose label contains
/// the boundary's year-month; the provider labels monthly rows with literal
/// month-end calendar dates, which are not predictable in advance. A boundary
/// with no matching label fails immediately.
pub(crate) fn resolve_monthly(
    symbol: &str,
    series: &TimeSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<TimeSeries, MarketDataError> {
    let (Some(start_pos), Some(end_pos)) = (
        month_position(series, start),
        month_position(series, end),
    ) else {
        return Err(resolution_error(symbol, start, end));
    };

    Ok(series.slice_ascending(end_pos, start_pos))
}

/// First row (in newest-first table order) whose label contains `date`'s
/// year-month.
fn month_position(series: &TimeSeries, date: NaiveDate) -> Option<usize> {
    let needle = date.format("%Y-%m").to_string();
    series
        .rows()
        .iter()
        .position(|bar| bar.date.format("%Y-%m-%d").to_string().contains(&needle))
}

fn resolution_error(symbol: &str, start: NaiveDate, end: NaiveDate) -> MarketDataError {
    error!(
        "{symbol}: no history rows between {start} and {end}; dates may be incorrect or out of range"
    );
    MarketDataError::RangeResolution {
        symbol: symbol.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    }
}
