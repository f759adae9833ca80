use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sampling frequency of a price series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    /// One row per trading day
    Daily,
    /// One row per calendar month, labeled with the month-end trading date
    Monthly,
}

/// One date-labeled row of adjusted OHLCV data plus distribution events.
///
/// Prices are dividend/split adjusted; the provider's raw traded close is
/// dropped during normalization and never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Calendar date of the row (month-end date at monthly granularity)
    pub date: NaiveDate,

    /// Opening price
    pub open: Decimal,

    /// High price
    pub high: Decimal,

    /// Low price
    pub low: Decimal,

    /// Adjusted closing price
    pub close: Decimal,

    /// Trading volume
    pub volume: Decimal,

    /// Dividend paid out on this date, zero otherwise
    pub dividend: Decimal,

    /// Split coefficient; `None` at monthly granularity, where the provider
    /// supplies no split data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<Decimal>,
}

impl Bar {
    /// Create a daily bar. Daily rows always carry a split coefficient.
    #[allow(clippy::too_many_arguments)]
    pub fn daily(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        dividend: Decimal,
        split: Decimal,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            dividend,
            split: Some(split),
        }
    }

    /// Create a monthly bar. Monthly rows never carry a split coefficient.
    #[allow(clippy::too_many_arguments)]
    pub fn monthly(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        dividend: Decimal,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            dividend,
            split: None,
        }
    }
}

/// A date-indexed price table at a single granularity.
///
/// Row labels are unique. A freshly parsed table holds rows newest-first, the
/// order the provider delivers them in; window resolution returns a table in
/// ascending date order.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    granularity: Granularity,
    rows: Vec<Bar>,
}

impl TimeSeries {
    /// Build a table from parsed rows, normalizing to newest-first order
    /// rather than trusting the provider's ordering.
    pub(crate) fn new(granularity: Granularity, mut rows: Vec<Bar>) -> Self {
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Self { granularity, rows }
    }

    /// Sampling frequency of this table.
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in table order.
    pub fn rows(&self) -> &[Bar] {
        &self.rows
    }

    /// First row in table order.
    pub fn first(&self) -> Option<&Bar> {
        self.rows.first()
    }

    /// Last row in table order.
    pub fn last(&self) -> Option<&Bar> {
        self.rows.last()
    }

    /// The row labeled `date`, if present.
    pub fn get(&self, date: NaiveDate) -> Option<&Bar> {
        self.position(date).map(|pos| &self.rows[pos])
    }

    /// Position of the row labeled `date` in the newest-first storage order.
    pub(crate) fn position(&self, date: NaiveDate) -> Option<usize> {
        self.rows
            .binary_search_by(|bar| bar.date.cmp(&date).reverse())
            .ok()
    }

    /// Rows from position `from` through `to` inclusive, reversed out of the
    /// newest-first storage order into ascending date order. Empty when the
    /// positions cross.
    pub(crate) fn slice_ascending(&self, from: usize, to: usize) -> TimeSeries {
        let rows = if from <= to {
            self.rows[from..=to].iter().rev().cloned().collect()
        } else {
            Vec::new()
        };
        TimeSeries {
            granularity: self.granularity,
            rows,
        }
    }
}
