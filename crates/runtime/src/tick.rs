use ledger::PortfolioState;
use market::{MarketSnapshot, Regime};
use serde::Serialize;

/// Scales accumulated return (%) into the road-height unit consumed by the
/// rendering collaborator.
pub const TERRAIN_HEIGHT_SCALE: f64 = 10.0;

/// Immutable per-tick snapshot for the rendering collaborator: price, equity,
/// the terrain mapping scalar, and pass-through indicator data. Pure
/// aggregation; nothing here is computed beyond unit conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestTick {
    pub index: u64,
    pub timestamp: i64,
    pub price: f64,
    pub portfolio_value: f64,
    pub accumulated_return: f64,
    pub terrain_height: f64,
    pub rsi: f64,
    pub atr: f64,
    pub volatility: f64,
    pub trend: f64,
    pub market_drawdown: f64,
    pub regime: Regime,
}

pub fn build_tick(
    index: u64,
    timestamp: i64,
    price: f64,
    portfolio: &PortfolioState,
    snapshot: &MarketSnapshot,
) -> BacktestTick {
    BacktestTick {
        index,
        timestamp,
        price,
        portfolio_value: portfolio.equity,
        accumulated_return: portfolio.accumulated_return_pct,
        terrain_height: portfolio.accumulated_return_pct * TERRAIN_HEIGHT_SCALE,
        rsi: snapshot.rsi,
        atr: snapshot.atr,
        volatility: snapshot.volatility,
        trend: snapshot.trend,
        market_drawdown: snapshot.drawdown,
        regime: snapshot.regime,
    }
}
