//! CSV response bodies → [`TimeSeries`] normalization.
//!
//! The history endpoints answer with CSV when `datatype=csv` is requested,
//! newest row first. Error conditions (bad symbol, bad key, throttling) come
//! back as a JSON blob instead, which fails the tabular check here. The raw
//! traded `close` column is dropped during normalization; `adjusted_close`
//! becomes the canonical close.

use std::str::FromStr;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use log::error;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{Bar, Granularity, TimeSeries};

/// Columns the daily endpoint must supply, in provider naming.
const DAILY_COLUMNS: [&str; 9] = [
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "adjusted_close",
    "volume",
    "dividend_amount",
    "split_coefficient",
];

/// Columns the monthly endpoint must supply; no split data at this granularity.
const MONTHLY_COLUMNS: [&str; 8] = [
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "adjusted_close",
    "volume",
    "dividend_amount",
];

#[derive(Debug, Deserialize)]
struct DailyRecord {
    timestamp: String,
    open: String,
    high: String,
    low: String,
    /// Raw traded close; dropped in favor of `adjusted_close`.
    #[allow(dead_code)]
    close: String,
    adjusted_close: String,
    volume: String,
    dividend_amount: String,
    split_coefficient: String,
}

#[derive(Debug, Deserialize)]
struct MonthlyRecord {
    timestamp: String,
    open: String,
    high: String,
    low: String,
    /// Raw traded close; dropped in favor of `adjusted_close`.
    #[allow(dead_code)]
    close: String,
    adjusted_close: String,
    volume: String,
    dividend_amount: String,
}

/// Parse a history response body into a normalized, newest-first table.
pub(crate) fn parse_series(
    symbol: &str,
    body: &str,
    granularity: Granularity,
) -> Result<TimeSeries, MarketDataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| parse_error(symbol, format!("unreadable header row: {e}")))?
        .clone();
    check_headers(symbol, &headers, granularity)?;

    let mut rows = Vec::new();
    match granularity {
        Granularity::Daily => {
            for result in reader.deserialize::<DailyRecord>() {
                let record =
                    result.map_err(|e| parse_error(symbol, format!("bad row: {e}")))?;
                rows.push(Bar {
                    date: parse_label(symbol, &record.timestamp)?,
                    open: parse_field(symbol, "open", &record.open)?,
                    high: parse_field(symbol, "high", &record.high)?,
                    low: parse_field(symbol, "low", &record.low)?,
                    close: parse_field(symbol, "adjusted_close", &record.adjusted_close)?,
                    volume: parse_field(symbol, "volume", &record.volume)?,
                    dividend: parse_field(symbol, "dividend_amount", &record.dividend_amount)?,
                    split: Some(parse_field(
                        symbol,
                        "split_coefficient",
                        &record.split_coefficient,
                    )?),
                });
            }
        }
        Granularity::Monthly => {
            for result in reader.deserialize::<MonthlyRecord>() {
                let record =
                    result.map_err(|e| parse_error(symbol, format!("bad row: {e}")))?;
                rows.push(Bar {
                    date: parse_label(symbol, &record.timestamp)?,
                    open: parse_field(symbol, "open", &record.open)?,
                    high: parse_field(symbol, "high", &record.high)?,
                    low: parse_field(symbol, "low", &record.low)?,
                    close: parse_field(symbol, "adjusted_close", &record.adjusted_close)?,
                    volume: parse_field(symbol, "volume", &record.volume)?,
                    dividend: parse_field(symbol, "dividend_amount", &record.dividend_amount)?,
                    split: None,
                });
            }
        }
    }

    Ok(TimeSeries::new(granularity, rows))
}

/// Reject non-tabular payloads, then require every expected column by name.
fn check_headers(
    symbol: &str,
    headers: &csv::StringRecord,
    granularity: Granularity,
) -> Result<(), MarketDataError> {
    if headers.len() < 2 {
        return Err(parse_error(
            symbol,
            "response is not tabular data; symbol or key may be invalid".to_string(),
        ));
    }

    let expected: &[&str] = match granularity {
        Granularity::Daily => &DAILY_COLUMNS,
        Granularity::Monthly => &MONTHLY_COLUMNS,
    };
    for name in expected {
        if !headers.iter().any(|h| h == *name) {
            error!("{symbol}: history data shape is incorrect, key may be invalid (no `{name}` column)");
            return Err(MarketDataError::Schema {
                symbol: symbol.to_string(),
                message: format!("missing column `{name}`"),
            });
        }
    }
    Ok(())
}

fn parse_label(symbol: &str, value: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| parse_error(symbol, format!("bad row label {value:?}")))
}

fn parse_field(symbol: &str, column: &str, value: &str) -> Result<Decimal, MarketDataError> {
    Decimal::from_str(value)
        .map_err(|_| parse_error(symbol, format!("bad numeric value {value:?} in `{column}`")))
}

fn parse_error(symbol: &str, message: String) -> MarketDataError {
    error!("{symbol}: could not decode history response: {message}");
    MarketDataError::Parse {
        symbol: symbol.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const DAILY_BODY: &str = "\
timestamp,open,high,low,close,adjusted_close,volume,dividend_amount,split_coefficient
2024-03-06,171.06,171.24,168.68,169.12,168.45,68587707,0.0000,1.0
2024-03-05,170.76,172.04,169.62,170.12,169.44,95132355,0.2400,1.0
2024-03-04,176.15,176.90,173.79,175.10,174.40,81510101,0.0000,4.0
";

    const MONTHLY_BODY: &str = "\
timestamp,open,high,low,close,adjusted_close,volume,dividend_amount
2023-03-31,146.83,165.00,143.90,164.90,163.76,1520266691,0.0000
2023-02-28,143.97,157.38,141.32,147.41,146.39,1307198265,0.2300
";

    #[test]
    fn test_parse_daily_series() {
        let series = parse_series("AAPL", DAILY_BODY, Granularity::Daily).unwrap();
        assert_eq!(series.granularity(), Granularity::Daily);
        assert_eq!(series.len(), 3);

        let newest = series.first().unwrap();
        assert_eq!(newest.date, "2024-03-06".parse().unwrap());
        assert_eq!(newest.open, dec!(171.06));
        // Canonical close is the adjusted one.
        assert_eq!(newest.close, dec!(168.45));
        assert_eq!(newest.volume, dec!(68587707));
        assert_eq!(series.rows()[1].dividend, dec!(0.2400));
        assert_eq!(series.rows()[2].split, Some(dec!(4.0)));
    }

    #[test]
    fn test_parse_daily_series_every_row_has_split() {
        let series = parse_series("AAPL", DAILY_BODY, Granularity::Daily).unwrap();
        assert!(series.rows().iter().all(|bar| bar.split.is_some()));
    }

    #[test]
    fn test_parse_monthly_series_has_no_split() {
        let series = parse_series("AAPL", MONTHLY_BODY, Granularity::Monthly).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.rows().iter().all(|bar| bar.split.is_none()));
        assert_eq!(series.first().unwrap().close, dec!(163.76));
    }

    #[test]
    fn test_parse_unordered_body_is_sorted_newest_first() {
        let shuffled = "\
timestamp,open,high,low,close,adjusted_close,volume,dividend_amount,split_coefficient
2024-03-04,176.15,176.90,173.79,175.10,174.40,81510101,0.0000,1.0
2024-03-06,171.06,171.24,168.68,169.12,168.45,68587707,0.0000,1.0
2024-03-05,170.76,172.04,169.62,170.12,169.44,95132355,0.0000,1.0
";
        let series = parse_series("AAPL", shuffled, Granularity::Daily).unwrap();
        assert_eq!(series.first().unwrap().date, "2024-03-06".parse().unwrap());
        assert_eq!(series.last().unwrap().date, "2024-03-04".parse().unwrap());
    }

    #[test]
    fn test_json_error_payload_is_a_parse_error() {
        let body = "{\n    \"Error Message\": \"Invalid API call.\"\n}";
        let result = parse_series("NOPE", body, Granularity::Daily);
        assert!(matches!(
            result,
            Err(MarketDataError::Parse { ref symbol, .. }) if symbol == "NOPE"
        ));
    }

    #[test]
    fn test_missing_adjusted_close_column_is_a_schema_error() {
        let body = "\
timestamp,open,high,low,close,volume,dividend_amount,split_coefficient
2024-03-06,171.06,171.24,168.68,169.12,68587707,0.0000,1.0
";
        let result = parse_series("AAPL", body, Granularity::Daily);
        assert!(matches!(
            result,
            Err(MarketDataError::Schema { ref message, .. })
                if message.contains("adjusted_close")
        ));
    }

    #[test]
    fn test_monthly_does_not_require_split_column() {
        let result = parse_series("AAPL", MONTHLY_BODY, Granularity::Monthly);
        assert!(result.is_ok());
    }

    #[test]
    fn test_bad_numeric_field_is_a_parse_error() {
        let body = "\
timestamp,open,high,low,close,adjusted_close,volume,dividend_amount,split_coefficient
2024-03-06,not-a-price,171.24,168.68,169.12,168.45,68587707,0.0000,1.0
";
        let result = parse_series("AAPL", body, Granularity::Daily);
        assert!(matches!(
            result,
            Err(MarketDataError::Parse { ref message, .. }) if message.contains("open")
        ));
    }

    #[test]
    fn test_bad_row_label_is_a_parse_error() {
        let body = "\
timestamp,open,high,low,close,adjusted_close,volume,dividend_amount,split_coefficient
03/06/2024,171.06,171.24,168.68,169.12,168.45,68587707,0.0000,1.0
";
        let result = parse_series("AAPL", body, Granularity::Daily);
        assert!(matches!(result, Err(MarketDataError::Parse { .. })));
    }
}
