use serde::Serialize;

use crate::candle::Candle;

pub const RSI_LOOKBACK: usize = 14;
pub const TREND_LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Bull,
    Bear,
    Crash,
    Recovery,
    Chop,
}

impl Regime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bull => "bull",
            Self::Bear => "bear",
            Self::Crash => "crash",
            Self::Recovery => "recovery",
            Self::Chop => "chop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub rsi: f64,
    pub atr: f64,
    pub volatility: f64,
    pub trend: f64,
    pub drawdown: f64,
    pub regime: Regime,
}

impl MarketSnapshot {
    pub fn neutral() -> Self {
        Self {
            rsi: 50.0,
            atr: 0.0,
            volatility: 0.0,
            trend: 0.0,
            drawdown: 0.0,
            regime: Regime::Chop,
        }
    }
}

/// Indicator snapshot for the candle at `index`. An out-of-range index
/// returns the neutral snapshot rather than an error.
pub fn snapshot_at(candles: &[Candle], index: usize) -> MarketSnapshot {
    if index >= candles.len() {
        return MarketSnapshot::neutral();
    }

    let rsi = rsi_at(candles, index);
    let trend = trend_at(candles, index);
    let drawdown = drawdown_at(candles, index);

    MarketSnapshot {
        rsi,
        atr: atr_at(candles, index),
        volatility: candles[index].rolling_volatility,
        trend,
        drawdown,
        regime: classify_regime(trend, rsi, drawdown),
    }
}

/// Wilder-style RSI over the last `min(14, index + 1)` candles. When the
/// window has no losses the relative strength is pinned at 100.
fn rsi_at(candles: &[Candle], index: usize) -> f64 {
    let lookback = RSI_LOOKBACK.min(index + 1);
    let start = index + 1 - lookback;

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in start..=index {
        if i == 0 {
            continue;
        }
        let change = candles[i].close - candles[i - 1].close;
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / lookback as f64;
    let avg_loss = losses / lookback as f64;
    let rs = if avg_loss == 0.0 {
        100.0
    } else {
        avg_gain / avg_loss
    };

    100.0 - 100.0 / (1.0 + rs)
}

fn atr_at(candles: &[Candle], index: usize) -> f64 {
    let lookback = RSI_LOOKBACK.min(index + 1);
    let start = index + 1 - lookback;
    let total: f64 = candles[start..=index]
        .iter()
        .map(|candle| candle.true_range)
        .sum();

    total / lookback as f64
}

fn trend_at(candles: &[Candle], index: usize) -> f64 {
    let lookback = TREND_LOOKBACK.min(index + 1);
    let start = index + 1 - lookback;
    let moving_average: f64 = candles[start..=index]
        .iter()
        .map(|candle| candle.close)
        .sum::<f64>()
        / lookback as f64;

    if moving_average <= 0.0 {
        return 0.0;
    }

    (candles[index].close - moving_average) / moving_average * 100.0
}

fn drawdown_at(candles: &[Candle], index: usize) -> f64 {
    let max_high = candles[..=index]
        .iter()
        .map(|candle| candle.high)
        .fold(f64::NEG_INFINITY, f64::max);

    if max_high <= 0.0 {
        return 0.0;
    }

    (max_high - candles[index].close) / max_high * 100.0
}

// Check order is significant: first match wins.
fn classify_regime(trend: f64, rsi: f64, drawdown: f64) -> Regime {
    if trend > 5.0 && rsi > 50.0 {
        return Regime::Bull;
    }
    if trend < -5.0 && rsi < 50.0 {
        return Regime::Bear;
    }
    if drawdown > 20.0 {
        return Regime::Crash;
    }
    if trend > 0.0 && drawdown > 10.0 {
        return Regime::Recovery;
    }

    Regime::Chop
}
