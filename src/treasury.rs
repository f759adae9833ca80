//! Risk-free rate lookup from the treasury yield endpoint.

use log::debug;
use serde::Deserialize;

use crate::client::{self, fetch_error, masked, BASE_URL};
use crate::errors::MarketDataError;
use crate::keys;

/// Diagnostic subject for rate-lookup errors; the endpoint has no symbol.
const SUBJECT: &str = "TREASURY_YIELD";

/// `TREASURY_YIELD` response body. Error conditions arrive as a 200 with one
/// of the provider's notice fields set and no `data` array.
#[derive(Debug, Deserialize)]
struct TreasuryYieldResponse {
    #[serde(default)]
    data: Vec<TreasuryPoint>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// One sample of the yield series; the first element is the most recent.
#[derive(Debug, Deserialize)]
struct TreasuryPoint {
    value: String,
}

/// Current 5-year treasury yield at monthly sampling, as a decimal fraction.
///
/// `key` of `None` falls back to the process-wide credential. The provider
/// reports percentage points, so a reported `"4.25"` comes back as `0.0425`.
pub fn risk_free_rate(key: Option<&str>) -> Result<f64, MarketDataError> {
    risk_free_rate_at(BASE_URL, key)
}

/// Same as [`risk_free_rate`], against a specific endpoint. Intended for
/// tests against a local mock server.
pub fn risk_free_rate_at(base_url: &str, key: Option<&str>) -> Result<f64, MarketDataError> {
    let key = key
        .map(str::to_string)
        .or_else(keys::global_key)
        .unwrap_or_default();
    let params = [
        ("function", "TREASURY_YIELD"),
        ("interval", "monthly"),
        ("maturity", "5year"),
        ("apikey", key.as_str()),
    ];

    let url = reqwest::Url::parse_with_params(base_url, &params)
        .map_err(|e| fetch_error(SUBJECT, format!("failed to build URL: {e}")))?;
    debug!("alphavantage request: {}", masked(url.as_str(), &key));

    let response = client::http_client().get(url).send().map_err(|e| {
        fetch_error(
            SUBJECT,
            format!("key may be invalid, the provider may be down, or there is no connectivity: {e}"),
        )
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(SUBJECT, format!("HTTP {status}")));
    }

    let body: TreasuryYieldResponse = response
        .json()
        .map_err(|e| fetch_error(SUBJECT, format!("unexpected response shape: {e}")))?;
    rate_from_response(body)
}

fn rate_from_response(body: TreasuryYieldResponse) -> Result<f64, MarketDataError> {
    if let Some(notice) = body.error_message.or(body.note).or(body.information) {
        return Err(fetch_error(
            SUBJECT,
            format!("provider declined the request: {notice}"),
        ));
    }

    let point = body
        .data
        .first()
        .ok_or_else(|| fetch_error(SUBJECT, "no yield data in response".to_string()))?;

    let percent: f64 = point.value.parse().map_err(|_| {
        fetch_error(
            SUBJECT,
            format!("could not parse yield value {:?}", point.value),
        )
    })?;
    Ok(percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> TreasuryYieldResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_most_recent_value_converted_to_fraction() {
        let body = response(
            r#"{
                "name": "5-Year Treasury Constant Maturity Rate",
                "interval": "monthly",
                "unit": "percent",
                "data": [
                    {"date": "2024-02-01", "value": "4.25"},
                    {"date": "2024-01-01", "value": "3.91"}
                ]
            }"#,
        );
        let rate = rate_from_response(body).unwrap();
        assert!((rate - 0.0425).abs() < 1e-12);
    }

    #[test]
    fn test_missing_data_array_fails() {
        let result = rate_from_response(response(r#"{"unit": "percent"}"#));
        assert!(matches!(
            result,
            Err(MarketDataError::Fetch { ref symbol, .. }) if symbol == SUBJECT
        ));
    }

    #[test]
    fn test_error_payload_fails() {
        let result = rate_from_response(response(
            r#"{"Error Message": "the parameter apikey is invalid or missing"}"#,
        ));
        assert!(matches!(result, Err(MarketDataError::Fetch { .. })));
    }

    #[test]
    fn test_unparseable_value_fails() {
        let result = rate_from_response(response(r#"{"data": [{"date": "2024-02-01", "value": "."}]}"#));
        assert!(matches!(
            result,
            Err(MarketDataError::Fetch { ref message, .. }) if message.contains('.')
        ));
    }
}
