use serde::Serialize;

use crate::config::LedgerConfig;
use crate::position::{ClosedPosition, Direction, Instrument, Position};

const EXPOSURE_STRESS_WEIGHT: f64 = 0.3;
const DRAWDOWN_STRESS_WEIGHT: f64 = 2.0;
// Losses weigh roughly 2.25x more than equivalent gains in perceived risk.
const LOSS_AVERSION_MULTIPLIER: f64 = 2.25;

/// Dollar sizing for the short position backing a hedge. The hedge planner
/// computes these; the ledger only applies them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeTicket {
    pub hedge_size: f64,
    pub cost_paid: f64,
    pub exposure_fraction: f64,
    pub beta: f64,
    pub hedges_position_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_realized_pnl: f64,
    pub equity: f64,
    pub max_drawdown: f64,
}

/// The aggregate root: cash, open positions, closed history, and the derived
/// risk/performance metrics. All operations are total; invalid requests
/// degrade to silent no-ops rather than errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioState {
    pub initial_capital: f64,
    pub cash: f64,
    pub equity: f64,
    pub positions: Vec<Position>,
    pub closed_positions: Vec<ClosedPosition>,
    pub total_exposure: f64,
    pub total_unrealized_pnl: f64,
    pub total_realized_pnl: f64,
    pub accumulated_return_pct: f64,
    pub accumulated_return_dollars: f64,
    pub peak_equity: f64,
    pub drawdown: f64,
    pub max_drawdown: f64,
    pub recovery_needed_pct: f64,
    pub margin_usage: f64,
    pub stress_level: f64,
    pub raw_stress: f64,
    #[serde(skip)]
    max_leverage: f64,
    #[serde(skip)]
    next_position_id: u64,
}

impl PortfolioState {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            initial_capital: config.initial_capital,
            cash: config.initial_capital,
            equity: config.initial_capital,
            positions: Vec::new(),
            closed_positions: Vec::new(),
            total_exposure: 0.0,
            total_unrealized_pnl: 0.0,
            total_realized_pnl: 0.0,
            accumulated_return_pct: 0.0,
            accumulated_return_dollars: 0.0,
            peak_equity: config.initial_capital,
            drawdown: 0.0,
            max_drawdown: 0.0,
            recovery_needed_pct: 0.0,
            margin_usage: 0.0,
            stress_level: 0.0,
            raw_stress: 0.0,
            max_leverage: config.max_leverage,
            next_position_id: 1,
        }
    }

    /// Opens a directional position sized as a fraction of current cash. The
    /// dollar value is reserved from cash immediately (margin reservation).
    /// Returns `None` without touching state when the request is invalid.
    pub fn open(
        &mut self,
        direction: Direction,
        size_fraction: f64,
        current_price: f64,
        tick_index: u64,
        timestamp: i64,
        leverage: f64,
    ) -> Option<u64> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return None;
        }
        if !size_fraction.is_finite() || !leverage.is_finite() || leverage < 0.0 {
            return None;
        }

        let position_value = self.cash * size_fraction;
        if position_value <= 0.0 {
            return None;
        }

        let id = self.allocate_position_id();
        self.cash -= position_value;
        self.total_exposure += size_fraction;
        self.positions.push(Position {
            id,
            direction,
            entry_price: current_price,
            entry_index: tick_index,
            entry_time: timestamp,
            size: size_fraction,
            size_in_dollars: position_value,
            current_price,
            unrealized_pnl: 0.0,
            unrealized_pnl_pct: 0.0,
            leverage,
            instrument: Instrument::Asset,
            is_hedge: false,
            beta: None,
            hedges_position_id: None,
        });

        Some(id)
    }

    /// Opens the synthetic index short backing a hedge. The hedge notional is
    /// reserved from cash like any other open; the activation cost is
    /// deducted as a true expense.
    pub fn open_hedge(
        &mut self,
        ticket: HedgeTicket,
        current_price: f64,
        tick_index: u64,
        timestamp: i64,
    ) -> Option<u64> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return None;
        }
        if !ticket.hedge_size.is_finite() || ticket.hedge_size <= 0.0 {
            return None;
        }

        let id = self.allocate_position_id();
        self.cash -= ticket.hedge_size + ticket.cost_paid;
        self.total_exposure += ticket.exposure_fraction;
        self.positions.push(Position {
            id,
            direction: Direction::Short,
            entry_price: current_price,
            entry_index: tick_index,
            entry_time: timestamp,
            size: ticket.exposure_fraction,
            size_in_dollars: ticket.hedge_size,
            current_price,
            unrealized_pnl: 0.0,
            unrealized_pnl_pct: 0.0,
            leverage: 1.0,
            instrument: Instrument::Index,
            is_hedge: true,
            beta: Some(ticket.beta),
            hedges_position_id: ticket.hedges_position_id,
        });

        Some(id)
    }

    /// Closes a position at the given price, returning its reserved dollars
    /// plus realized P&L to cash. An unknown id is a silent no-op; callers
    /// that need to warn detect the `None`.
    pub fn close(
        &mut self,
        position_id: u64,
        current_price: f64,
        tick_index: u64,
    ) -> Option<ClosedPosition> {
        let slot = self
            .positions
            .iter()
            .position(|position| position.id == position_id)?;

        let mut position = self.positions.remove(slot);
        position.mark_to_market(current_price);

        let closed = ClosedPosition::from_marked(&position, tick_index);
        self.cash += closed.size_in_dollars + closed.realized_pnl;
        self.total_realized_pnl += closed.realized_pnl;
        self.total_exposure -= closed.size;
        self.closed_positions.push(closed.clone());

        Some(closed)
    }

    /// Folds `close` over a snapshot of the open ids, so removal during
    /// iteration cannot skip entries. Returns the number closed.
    pub fn close_all(&mut self, current_price: f64, tick_index: u64) -> usize {
        let ids: Vec<u64> = self.positions.iter().map(|position| position.id).collect();
        let mut closed_count = 0;
        for id in ids {
            if self.close(id, current_price, tick_index).is_some() {
                closed_count += 1;
            }
        }

        closed_count
    }

    /// Marks every open position and recomputes the aggregate metrics in
    /// dependency order. Peak equity and max drawdown only ever ratchet up.
    pub fn recompute(&mut self, current_price: f64) {
        for position in &mut self.positions {
            position.mark_to_market(current_price);
        }

        self.total_unrealized_pnl = self
            .positions
            .iter()
            .map(|position| position.unrealized_pnl)
            .sum();
        self.total_exposure = self.positions.iter().map(|position| position.size).sum();

        let reserved: f64 = self
            .positions
            .iter()
            .map(|position| position.size_in_dollars)
            .sum();
        self.equity = self.cash + reserved + self.total_unrealized_pnl;

        self.accumulated_return_dollars = self.equity - self.initial_capital;
        self.accumulated_return_pct = if self.initial_capital > 0.0 {
            self.accumulated_return_dollars / self.initial_capital * 100.0
        } else {
            0.0
        };

        self.peak_equity = self.peak_equity.max(self.equity);
        self.drawdown = if self.peak_equity > 0.0 {
            (self.peak_equity - self.equity) / self.peak_equity
        } else {
            0.0
        };
        self.max_drawdown = self.max_drawdown.max(self.drawdown);
        self.recovery_needed_pct = recovery_needed_pct(self.drawdown);

        self.raw_stress = (self.total_exposure * EXPOSURE_STRESS_WEIGHT
            + self.drawdown * DRAWDOWN_STRESS_WEIGHT)
            .min(1.0);
        self.stress_level = if self.total_unrealized_pnl < 0.0 {
            (self.raw_stress * LOSS_AVERSION_MULTIPLIER).min(1.0)
        } else {
            self.raw_stress
        };

        self.margin_usage = self.total_exposure / self.max_leverage;
    }

    pub fn position(&self, position_id: u64) -> Option<&Position> {
        self.positions
            .iter()
            .find(|position| position.id == position_id)
    }

    pub fn unrealized_pnl_for(&self, position_id: u64) -> Option<f64> {
        self.position(position_id)
            .map(|position| position.unrealized_pnl)
    }

    /// Signed dollar exposure of the open non-hedge positions; the input the
    /// hedge planner sizes against.
    pub fn net_directional_dollars(&self) -> f64 {
        self.positions
            .iter()
            .filter(|position| !position.is_hedge)
            .map(|position| position.direction.sign() * position.size_in_dollars)
            .sum()
    }

    pub fn has_open_directional_positions(&self) -> bool {
        self.positions.iter().any(|position| !position.is_hedge)
    }

    pub fn summary(&self) -> LedgerSummary {
        let winning_trades = self
            .closed_positions
            .iter()
            .filter(|closed| closed.realized_pnl > 0.0)
            .count();
        let losing_trades = self
            .closed_positions
            .iter()
            .filter(|closed| closed.realized_pnl < 0.0)
            .count();
        let decided = winning_trades + losing_trades;
        let win_rate = if decided > 0 {
            winning_trades as f64 / decided as f64
        } else {
            0.0
        };

        LedgerSummary {
            trade_count: self.closed_positions.len(),
            winning_trades,
            losing_trades,
            win_rate,
            total_realized_pnl: self.total_realized_pnl,
            equity: self.equity,
            max_drawdown: self.max_drawdown,
        }
    }

    fn allocate_position_id(&mut self) -> u64 {
        let id = self.next_position_id;
        self.next_position_id += 1;
        id
    }
}

/// Recovering from a loss of fraction `d` requires a gain of `d / (1 - d)`.
/// Diverges as `d` approaches 1; reported as infinite at or past it.
pub fn recovery_needed_pct(drawdown: f64) -> f64 {
    if drawdown <= 0.0 {
        return 0.0;
    }
    if drawdown >= 1.0 {
        return f64::INFINITY;
    }

    drawdown / (1.0 - drawdown) * 100.0
}

#[cfg(test)]
mod tests {
    use super::{recovery_needed_pct, HedgeTicket, PortfolioState};
    use crate::config::LedgerConfig;
    use crate::position::Direction;

    fn portfolio() -> PortfolioState {
        PortfolioState::new(LedgerConfig::default())
    }

    #[test]
    fn open_reserves_fraction_of_cash_as_margin() {
        let mut portfolio = portfolio();

        let id = portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);

        assert!(id.is_some());
        assert_eq!(portfolio.cash, 5_000.0);
        assert_eq!(portfolio.positions[0].size_in_dollars, 5_000.0);
        assert_eq!(portfolio.total_exposure, 0.5);
    }

    #[test]
    fn open_sizes_against_cash_not_equity() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);

        // Second open sees 5000 cash, not 10000 equity.
        portfolio.open(Direction::Long, 0.5, 100.0, 1, 0, 1.0);

        assert_eq!(portfolio.positions[1].size_in_dollars, 2_500.0);
        assert_eq!(portfolio.cash, 2_500.0);
    }

    #[test]
    fn zero_and_negative_order_sizes_are_silent_no_ops() {
        let mut portfolio = portfolio();
        let before = portfolio.clone();

        assert!(portfolio.open(Direction::Long, 0.0, 100.0, 0, 0, 1.0).is_none());
        assert!(portfolio.open(Direction::Long, -0.2, 100.0, 0, 0, 1.0).is_none());
        assert!(portfolio
            .open(Direction::Long, f64::NAN, 100.0, 0, 0, 1.0)
            .is_none());
        assert!(portfolio.open(Direction::Long, 0.5, 0.0, 0, 0, 1.0).is_none());
        assert_eq!(portfolio, before);
    }

    #[test]
    fn closing_unknown_id_is_a_silent_no_op() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);
        let before = portfolio.clone();

        assert!(portfolio.close(99, 110.0, 5).is_none());
        assert_eq!(portfolio, before);
    }

    #[test]
    fn double_close_only_settles_once() {
        let mut portfolio = portfolio();
        let id = portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0).unwrap();

        assert!(portfolio.close(id, 100.0, 1).is_some());
        let cash_after_first = portfolio.cash;
        assert!(portfolio.close(id, 100.0, 2).is_none());

        assert_eq!(portfolio.cash, cash_after_first);
        assert_eq!(portfolio.closed_positions.len(), 1);
    }

    #[test]
    fn capital_is_conserved_when_exit_price_equals_entry_price() {
        let mut portfolio = portfolio();
        let cash_before = portfolio.cash;
        let id = portfolio.open(Direction::Long, 0.37, 84.2, 0, 0, 2.0).unwrap();

        portfolio.close(id, 84.2, 3);

        assert_eq!(portfolio.cash, cash_before);
        assert_eq!(portfolio.total_realized_pnl, 0.0);
    }

    #[test]
    fn end_to_end_profitable_long_round_trip() {
        let mut portfolio = portfolio();
        let id = portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0).unwrap();
        assert_eq!(portfolio.cash, 5_000.0);

        portfolio.recompute(110.0);
        assert_eq!(portfolio.total_unrealized_pnl, 500.0);
        assert_eq!(portfolio.equity, 10_500.0);

        let closed = portfolio.close(id, 110.0, 4).unwrap();
        assert_eq!(closed.realized_pnl, 500.0);
        assert_eq!(closed.holding_period, 4);
        assert_eq!(portfolio.cash, 10_500.0);
        assert_eq!(portfolio.total_realized_pnl, 500.0);
        assert!(portfolio.positions.is_empty());
    }

    #[test]
    fn close_all_folds_over_a_snapshot_of_open_ids() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.2, 100.0, 0, 0, 1.0);
        portfolio.open(Direction::Short, 0.2, 100.0, 0, 0, 1.0);
        portfolio.open(Direction::Long, 0.2, 100.0, 0, 0, 1.0);

        let closed_count = portfolio.close_all(100.0, 2);

        assert_eq!(closed_count, 3);
        assert!(portfolio.positions.is_empty());
        assert_eq!(portfolio.closed_positions.len(), 3);
        assert_eq!(portfolio.cash, 10_000.0);
    }

    #[test]
    fn peak_equity_and_max_drawdown_are_monotone_under_oscillation() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);

        let mut prior_peak = 0.0;
        let mut prior_max_drawdown = 0.0;
        for price in [110.0, 90.0, 130.0, 70.0, 120.0, 60.0, 140.0] {
            portfolio.recompute(price);
            assert!(portfolio.peak_equity >= prior_peak);
            assert!(portfolio.max_drawdown >= prior_max_drawdown);
            prior_peak = portfolio.peak_equity;
            prior_max_drawdown = portfolio.max_drawdown;
        }

        assert_eq!(prior_peak, 12_000.0);
    }

    #[test]
    fn drawdown_measures_decline_from_peak() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);

        portfolio.recompute(120.0);
        assert_eq!(portfolio.drawdown, 0.0);

        portfolio.recompute(100.0);
        // Peak 11000, equity back to 10000.
        assert!((portfolio.drawdown - 1_000.0 / 11_000.0).abs() < 1e-12);
    }

    #[test]
    fn recovery_law_round_trips_reference_points() {
        assert_eq!(recovery_needed_pct(0.0), 0.0);
        assert_eq!(recovery_needed_pct(-0.1), 0.0);
        assert!((recovery_needed_pct(0.5) - 100.0).abs() < 1e-12);
        assert!((recovery_needed_pct(0.9) - 900.0).abs() < 1e-9);
        assert_eq!(recovery_needed_pct(1.0), f64::INFINITY);
    }

    #[test]
    fn stress_is_amplified_only_under_aggregate_unrealized_loss() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.4, 100.0, 0, 0, 1.0);

        portfolio.recompute(101.0);
        let winning_raw = portfolio.raw_stress;
        assert_eq!(portfolio.stress_level, winning_raw);

        portfolio.recompute(99.0);
        assert!(portfolio.total_unrealized_pnl < 0.0);
        assert!(portfolio.stress_level > portfolio.raw_stress);
        assert!((portfolio.stress_level - (portfolio.raw_stress * 2.25).min(1.0)).abs() < 1e-12);
    }

    #[test]
    fn stress_components_are_capped_at_one() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.9, 100.0, 0, 0, 3.0);

        // Leveraged collapse: deep drawdown pushes raw stress past the cap.
        portfolio.recompute(70.0);

        assert_eq!(portfolio.raw_stress, 1.0);
        assert_eq!(portfolio.stress_level, 1.0);
    }

    #[test]
    fn margin_usage_is_exposure_over_leverage_ceiling() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.6, 100.0, 0, 0, 1.0);

        portfolio.recompute(100.0);

        assert!((portfolio.margin_usage - 0.2).abs() < 1e-12);
    }

    #[test]
    fn equity_identity_holds_with_mixed_open_positions() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.3, 100.0, 0, 0, 1.0);
        portfolio.open(Direction::Short, 0.2, 100.0, 0, 0, 2.0);

        portfolio.recompute(107.0);

        let reserved: f64 = portfolio
            .positions
            .iter()
            .map(|position| position.size_in_dollars)
            .sum();
        assert!(
            (portfolio.equity - (portfolio.cash + reserved + portfolio.total_unrealized_pnl)).abs()
                < 1e-9
        );
    }

    #[test]
    fn hedge_ticket_reserves_notional_and_expenses_cost() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);

        let id = portfolio
            .open_hedge(
                HedgeTicket {
                    hedge_size: 3_500.0,
                    cost_paid: 17.5,
                    exposure_fraction: 0.35,
                    beta: 0.7,
                    hedges_position_id: None,
                },
                100.0,
                0,
                0,
            )
            .unwrap();

        assert_eq!(portfolio.cash, 5_000.0 - 3_500.0 - 17.5);
        let hedge = portfolio.position(id).unwrap();
        assert!(hedge.is_hedge);
        assert_eq!(hedge.direction, Direction::Short);
        assert_eq!(hedge.beta, Some(0.7));

        // Only the cost leaves equity.
        portfolio.recompute(100.0);
        assert_eq!(portfolio.equity, 10_000.0 - 17.5);
    }

    #[test]
    fn hedge_short_offsets_long_losses_in_a_downturn() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);
        portfolio
            .open_hedge(
                HedgeTicket {
                    hedge_size: 3_500.0,
                    cost_paid: 17.5,
                    exposure_fraction: 0.35,
                    beta: 0.7,
                    hedges_position_id: None,
                },
                100.0,
                0,
                0,
            )
            .unwrap();

        portfolio.recompute(90.0);

        // Long loses 500, hedge short gains 350.
        assert!((portfolio.total_unrealized_pnl - (-500.0 + 350.0)).abs() < 1e-9);
    }

    #[test]
    fn snapshot_serializes_contract_fields_and_hides_internals() {
        let mut portfolio = portfolio();
        portfolio.open(Direction::Long, 0.5, 100.0, 0, 0, 1.0);
        portfolio.recompute(110.0);

        let snapshot = serde_json::to_value(&portfolio).unwrap();

        assert_eq!(snapshot["equity"], 10_500.0);
        assert_eq!(snapshot["cash"], 5_000.0);
        assert_eq!(snapshot["positions"][0]["direction"], "long");
        assert!(snapshot.get("max_leverage").is_none());
        assert!(snapshot.get("next_position_id").is_none());
    }

    #[test]
    fn summary_counts_winners_and_losers() {
        let mut portfolio = portfolio();
        let first = portfolio.open(Direction::Long, 0.2, 100.0, 0, 0, 1.0).unwrap();
        let second = portfolio.open(Direction::Long, 0.2, 100.0, 0, 0, 1.0).unwrap();
        let third = portfolio.open(Direction::Short, 0.2, 100.0, 0, 0, 1.0).unwrap();

        portfolio.close(first, 110.0, 1);
        portfolio.close(second, 95.0, 2);
        portfolio.close(third, 110.0, 3);
        portfolio.recompute(110.0);

        let summary = portfolio.summary();
        assert_eq!(summary.trade_count, 3);
        assert_eq!(summary.winning_trades, 1);
        assert_eq!(summary.losing_trades, 2);
        assert!((summary.win_rate - 1.0 / 3.0).abs() < 1e-12);
    }
}
