//! Blocking Alpha Vantage quote client.
//!
//! [`Stock`] is bound to a single symbol and a credential. Each operation is
//! one blocking HTTP round trip: fetch, decode, normalize, and (for history)
//! resolve the caller's date window before returning. Nothing is cached or
//! shared across calls.

mod range;
mod table;

use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, error, warn};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::keys;
use crate::models::{Fundamentals, Granularity, TimeSeries};

pub(crate) const BASE_URL: &str = "https://www.alphavantage.co/query";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Quote and fundamentals client bound to a single symbol.
///
/// The credential is resolved at construction: an explicit key via
/// [`with_key`](Stock::with_key) wins, otherwise the process-wide key set with
/// [`set_global_key`](crate::set_global_key) is used. Construction succeeds
/// even when neither is present; the provider rejects the unauthenticated
/// request later, surfaced as [`MarketDataError::Fetch`].
pub struct Stock {
    symbol: String,
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl Stock {
    /// Create a client for `symbol` using the process-wide credential.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let api_key = keys::global_key();
        if api_key.is_none() {
            warn!("{symbol}: no global key has been set and no key was passed; requests will be rejected by the provider");
        }
        Self::build(symbol, api_key)
    }

    /// Create a client for `symbol` with an explicit credential, ignoring the
    /// process-wide one.
    pub fn with_key(symbol: impl Into<String>, key: impl Into<String>) -> Self {
        Self::build(symbol.into(), Some(key.into()))
    }

    fn build(symbol: String, api_key: Option<String>) -> Self {
        Self {
            symbol,
            api_key,
            base_url: BASE_URL.to_string(),
            client: http_client(),
        }
    }

    /// Point the client at a different endpoint. Intended for tests against a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The symbol this client is bound to.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Adjusted price history for the caller's date window.
    ///
    /// `start` and `end` are `YYYY-MM-DD` calendar dates, inclusive. The
    /// provider only has rows for trading days (daily) or month-end dates
    /// (monthly), so the boundaries are resolved to actual row labels before
    /// slicing. Returned rows are in ascending date order.
    pub fn history(
        &self,
        start: &str,
        end: &str,
        granularity: Granularity,
    ) -> Result<TimeSeries, MarketDataError> {
        let function = match granularity {
            Granularity::Daily => "TIME_SERIES_DAILY_ADJUSTED",
            Granularity::Monthly => "TIME_SERIES_MONTHLY_ADJUSTED",
        };
        let params = [
            ("function", function),
            ("symbol", self.symbol.as_str()),
            ("datatype", "csv"),
            ("outputsize", "full"),
        ];
        let body = self.fetch(&params)?;
        let series = table::parse_series(&self.symbol, &body, granularity)?;

        let start = parse_input_date(start)?;
        let end = parse_input_date(end)?;

        match granularity {
            Granularity::Daily => range::resolve_daily(&self.symbol, &series, start, end),
            Granularity::Monthly => range::resolve_monthly(&self.symbol, &series, start, end),
        }
    }

    /// Company overview: name, sector, ratios and other key metrics, exactly
    /// as the provider reports them.
    pub fn info(&self) -> Result<Fundamentals, MarketDataError> {
        let params = [("function", "OVERVIEW"), ("symbol", self.symbol.as_str())];
        let body = self.fetch(&params)?;

        let record: Fundamentals = serde_json::from_str(&body).map_err(|e| {
            error!("{}: overview response is not a JSON object; symbol or key may be invalid", self.symbol);
            MarketDataError::Fetch {
                symbol: self.symbol.clone(),
                message: format!("overview decode failed: {e}"),
            }
        })?;

        check_overview_payload(&self.symbol, &record)?;
        Ok(record)
    }

    /// Perform one GET against the provider and return the body as text.
    fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let key = self.api_key.clone().unwrap_or_default();
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", key.as_str()));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            fetch_error(&self.symbol, format!("failed to build URL: {e}"))
        })?;
        debug!("alphavantage request: {}", masked(url.as_str(), &key));

        let response = self.client.get(url).send().map_err(|e| {
            fetch_error(
                &self.symbol,
                format!("symbol or key may be invalid, the provider may be down, or there is no connectivity: {e}"),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(&self.symbol, format!("HTTP {status}")));
        }

        response
            .text()
            .map_err(|e| fetch_error(&self.symbol, format!("unreadable body: {e}")))
    }
}

/// Blocking HTTP client with the crate-wide request timeout.
pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Render `url` with the credential hidden.
pub(crate) fn masked(url: &str, key: &str) -> String {
    if key.is_empty() {
        url.to_string()
    } else {
        url.replace(key, "***")
    }
}

/// Log and build a [`MarketDataError::Fetch`].
pub(crate) fn fetch_error(symbol: &str, message: String) -> MarketDataError {
    error!("{symbol}: fetch failed: {message}");
    MarketDataError::Fetch {
        symbol: symbol.to_string(),
        message,
    }
}

fn parse_input_date(input: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        error!("invalid start/end date {input:?}; expected YYYY-MM-DD");
        MarketDataError::DateFormat {
            input: input.to_string(),
        }
    })
}

/// The provider reports request-level problems inside a 200 body: an
/// `Error Message` for bad calls, a `Note`/`Information` for throttled or
/// demo keys, or an empty object for an unknown overview symbol.
fn check_overview_payload(symbol: &str, record: &Fundamentals) -> Result<(), MarketDataError> {
    if let Some(message) = record.get("Error Message").and_then(Value::as_str) {
        return Err(fetch_error(symbol, message.to_string()));
    }
    for field in ["Note", "Information"] {
        if let Some(message) = record.get(field).and_then(Value::as_str) {
            return Err(fetch_error(
                symbol,
                format!("provider declined the request: {message}"),
            ));
        }
    }
    if record.is_empty() {
        return Err(fetch_error(
            symbol,
            "no overview data; symbol or key may be invalid".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_date() {
        assert_eq!(
            parse_input_date("2024-01-15").unwrap(),
            "2024-01-15".parse::<NaiveDate>().unwrap()
        );
        assert_eq!(
            parse_input_date(" 2024-01-15 ").unwrap(),
            "2024-01-15".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_parse_input_date_invalid() {
        let result = parse_input_date("01-15-2024");
        assert!(matches!(
            result,
            Err(MarketDataError::DateFormat { ref input }) if input == "01-15-2024"
        ));
        assert!(parse_input_date("not a date").is_err());
    }

    #[test]
    fn test_masked_hides_the_key() {
        let url = "https://example.com/query?symbol=AAPL&apikey=sekrit";
        assert_eq!(
            masked(url, "sekrit"),
            "https://example.com/query?symbol=AAPL&apikey=***"
        );
        // An unset key must not be substituted everywhere.
        assert_eq!(masked(url, ""), url);
    }

    #[test]
    fn test_overview_error_message_payload_fails() {
        let record: Fundamentals = serde_json::from_str(
            r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#,
        )
        .unwrap();
        let result = check_overview_payload("NOPE", &record);
        assert!(matches!(
            result,
            Err(MarketDataError::Fetch { ref symbol, .. }) if symbol == "NOPE"
        ));
    }

    #[test]
    fn test_overview_rate_limit_note_fails() {
        let record: Fundamentals = serde_json::from_str(
            r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#,
        )
        .unwrap();
        assert!(check_overview_payload("AAPL", &record).is_err());
    }

    #[test]
    fn test_overview_empty_object_fails() {
        let record = Fundamentals::new();
        assert!(check_overview_payload("AAPL", &record).is_err());
    }

    #[test]
    fn test_overview_real_payload_passes() {
        let record: Fundamentals = serde_json::from_str(
            r#"{"Symbol": "AAPL", "Name": "Apple Inc", "PERatio": "28.1"}"#,
        )
        .unwrap();
        assert!(check_overview_payload("AAPL", &record).is_ok());
    }

    #[test]
    fn test_with_key_binds_symbol() {
        let stock = Stock::with_key("AAPL", "test-key");
        assert_eq!(stock.symbol(), "AAPL");
    }
}
