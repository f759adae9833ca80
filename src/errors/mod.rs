//! Error types for market data operations.
//!
//! Every fallible operation in this crate returns [`MarketDataError`]. The
//! taxonomy is closed so callers can branch on the variant instead of matching
//! on message text; the freeform diagnostics are logged at the point of origin
//! and carried in the variant for display.

use thiserror::Error;

/// Errors that can occur while fetching or reshaping market data.
///
/// Failures are logged with the symbol and probable cause where they arise,
/// then returned unchanged. There is no local recovery and no partial result:
/// an operation either yields the fully resolved table/record or fails with
/// one of these variants.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The HTTP request failed or the provider refused it.
    ///
    /// Covers transport errors (no connectivity, provider outage), non-success
    /// status codes, and API-level error payloads on the JSON endpoints caused
    /// by an unknown symbol or a missing/invalid credential.
    #[error("fetch failed for {symbol}: {message}")]
    Fetch {
        /// The symbol the request was for (`TREASURY_YIELD` for the rate lookup)
        symbol: String,
        /// Human-readable cause
        message: String,
    },

    /// The response body is not the expected tabular or structured data.
    ///
    /// Typically the provider answered a CSV request with a JSON error blob
    /// because the symbol or credential is invalid; also raised for malformed
    /// row labels or numeric fields.
    #[error("could not decode response for {symbol}: {message}")]
    Parse {
        /// The symbol the response was for
        symbol: String,
        /// What failed to decode
        message: String,
    },

    /// The response decoded as a table, but an expected column is absent.
    #[error("unexpected response shape for {symbol}: {message}")]
    Schema {
        /// The symbol the response was for
        symbol: String,
        /// Which column was missing
        message: String,
    },

    /// A caller-supplied date could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date: {input}")]
    DateFormat {
        /// The rejected input
        input: String,
    },

    /// The requested window could not be resolved against the fetched series
    /// within the bounded candidate search.
    ///
    /// The window lies outside the available history, or the boundaries are
    /// malformed. Terminal for the call; never retried.
    #[error("no rows resolvable for {symbol} between {start} and {end}")]
    RangeResolution {
        /// The symbol the series was for
        symbol: String,
        /// Requested window start, as supplied by the caller
        start: String,
        /// Requested window end, as supplied by the caller
        end: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::Fetch {
            symbol: "AAPL".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert_eq!(format!("{}", error), "fetch failed for AAPL: HTTP 503");

        let error = MarketDataError::Schema {
            symbol: "AAPL".to_string(),
            message: "missing column `adjusted_close`".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "unexpected response shape for AAPL: missing column `adjusted_close`"
        );

        let error = MarketDataError::DateFormat {
            input: "13/01/2023".to_string(),
        };
        assert_eq!(format!("{}", error), "invalid date: 13/01/2023");

        let error = MarketDataError::RangeResolution {
            symbol: "AAPL".to_string(),
            start: "1980-01-01".to_string(),
            end: "1980-02-01".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "no rows resolvable for AAPL between 1980-01-01 and 1980-02-01"
        );
    }
}
