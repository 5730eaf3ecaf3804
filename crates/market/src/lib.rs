pub mod candle;
pub mod indicators;

pub use candle::{parse_candle_date, Candle, CandleDateError};
pub use indicators::{snapshot_at, MarketSnapshot, Regime};
