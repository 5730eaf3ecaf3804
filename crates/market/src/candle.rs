use serde::{Deserialize, Serialize};
use time::{format_description, Date};

/// One preprocessed candle from the data-acquisition collaborator. The base
/// derivations (returns, volatility, true range) are computed upstream; this
/// crate never re-derives them from raw OHLC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub daily_return: f64,
    pub intraday_volatility: f64,
    pub true_range: f64,
    pub rolling_volatility: f64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleDateError {
    InvalidDate,
}

impl Candle {
    /// Unix timestamp (seconds, midnight UTC) derived from the candle date.
    pub fn timestamp(&self) -> Result<i64, CandleDateError> {
        parse_candle_date(&self.date).map(|date| date.midnight().assume_utc().unix_timestamp())
    }
}

pub fn parse_candle_date(raw: &str) -> Result<Date, CandleDateError> {
    let format = format_description::parse("[year]-[month]-[day]")
        .map_err(|_| CandleDateError::InvalidDate)?;
    Date::parse(raw, &format).map_err(|_| CandleDateError::InvalidDate)
}
