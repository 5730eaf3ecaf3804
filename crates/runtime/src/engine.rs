use hedge::{plan_activation, process_tick, HedgeKind, SkillState};
use ledger::{Direction, HedgeTicket, LedgerConfig, LedgerSummary, PortfolioState};
use market::{snapshot_at, Candle};

use crate::events::EngineEvent;
use crate::tick::{build_tick, BacktestTick};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub ledger: LedgerConfig,
    pub player_level: u32,
    pub max_hedges: usize,
    pub default_leverage: f64,
    pub hedge_cost_reduction: f64,
    pub hedge_cooldown_reduction: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            player_level: 1,
            max_hedges: 2,
            default_leverage: 1.0,
            hedge_cost_reduction: 0.0,
            hedge_cooldown_reduction: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    index: u64,
    price: f64,
    timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub record: BacktestTick,
    pub events: Vec<EngineEvent>,
}

/// One simulation timeline: the portfolio ledger, hedge governance, and the
/// tick records produced so far. The external clock decides when to advance;
/// commands are applied between ticks against the last seen price.
#[derive(Debug, Clone)]
pub struct Session {
    portfolio: PortfolioState,
    skill: SkillState,
    ticks: Vec<BacktestTick>,
    cursor: Option<Cursor>,
    default_leverage: f64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            portfolio: PortfolioState::new(config.ledger),
            skill: SkillState {
                max_hedges: config.max_hedges,
                player_level: config.player_level,
                hedge_cost_reduction: config.hedge_cost_reduction,
                hedge_cooldown_reduction: config.hedge_cooldown_reduction,
                ..SkillState::default()
            },
            ticks: Vec::new(),
            cursor: None,
            default_leverage: config.default_leverage,
        }
    }

    pub fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }

    pub fn skill(&self) -> &SkillState {
        &self.skill
    }

    pub fn ticks(&self) -> &[BacktestTick] {
        &self.ticks
    }

    pub fn last_tick(&self) -> Option<&BacktestTick> {
        self.ticks.last()
    }

    pub fn summary(&self) -> LedgerSummary {
        self.portfolio.summary()
    }

    /// Processes one tick: mark-to-market, aggregate recompute, hedge expiry
    /// (expired hedges close their backing position at this price), then the
    /// tick record. Returns `None` for an out-of-range or non-increasing
    /// index; replay must be strictly sequential.
    pub fn advance(
        &mut self,
        candles: &[Candle],
        index: usize,
        timestamp: i64,
    ) -> Option<TickOutcome> {
        if index >= candles.len() {
            return None;
        }
        let tick_index = index as u64;
        if let Some(cursor) = self.cursor {
            if tick_index <= cursor.index {
                return None;
            }
        }

        let price = candles[index].close;
        self.portfolio.recompute(price);

        let report = {
            let portfolio = &self.portfolio;
            process_tick(&mut self.skill, tick_index, price, |position_id| {
                portfolio.unrealized_pnl_for(position_id)
            })
        };
        for position_id in &report.positions_to_close {
            self.portfolio.close(*position_id, price, tick_index);
        }
        if !report.positions_to_close.is_empty() {
            self.portfolio.recompute(price);
        }
        let events: Vec<EngineEvent> = report.expired.iter().map(EngineEvent::hedge_expired).collect();

        self.cursor = Some(Cursor {
            index: tick_index,
            price,
            timestamp,
        });

        let snapshot = snapshot_at(candles, index);
        let record = build_tick(tick_index, timestamp, price, &self.portfolio, &snapshot);
        self.ticks.push(record.clone());

        Some(TickOutcome { record, events })
    }

    pub fn open_long(&mut self, size_fraction: f64, leverage: Option<f64>) -> EngineEvent {
        self.open_directional(Direction::Long, size_fraction, leverage, "open_long")
    }

    pub fn open_short(&mut self, size_fraction: f64, leverage: Option<f64>) -> EngineEvent {
        self.open_directional(Direction::Short, size_fraction, leverage, "open_short")
    }

    fn open_directional(
        &mut self,
        direction: Direction,
        size_fraction: f64,
        leverage: Option<f64>,
        command: &str,
    ) -> EngineEvent {
        let Some(cursor) = self.cursor else {
            return EngineEvent::no_effect(command);
        };

        let leverage = leverage.unwrap_or(self.default_leverage);
        let opened = self.portfolio.open(
            direction,
            size_fraction,
            cursor.price,
            cursor.index,
            cursor.timestamp,
            leverage,
        );
        match opened {
            Some(position_id) => {
                self.portfolio.recompute(cursor.price);
                match self.portfolio.position(position_id) {
                    Some(position) => EngineEvent::position_opened(position),
                    None => EngineEvent::no_effect(command),
                }
            }
            None => EngineEvent::no_effect(command),
        }
    }

    pub fn close_position(&mut self, position_id: u64) -> EngineEvent {
        let Some(cursor) = self.cursor else {
            return EngineEvent::no_effect("close_position");
        };

        match self.portfolio.close(position_id, cursor.price, cursor.index) {
            Some(closed) => {
                self.portfolio.recompute(cursor.price);
                EngineEvent::position_closed(&closed)
            }
            None => EngineEvent::no_effect("close_position"),
        }
    }

    pub fn close_all(&mut self) -> EngineEvent {
        let Some(cursor) = self.cursor else {
            return EngineEvent::no_effect("close_all_positions");
        };

        let closed_count = self.portfolio.close_all(cursor.price, cursor.index);
        self.portfolio.recompute(cursor.price);
        EngineEvent::all_positions_closed(closed_count)
    }

    /// Activates a hedge of the given type, defaulting to `basic`.
    pub fn activate_hedge(&mut self, kind: Option<HedgeKind>) -> EngineEvent {
        let Some(cursor) = self.cursor else {
            return EngineEvent::no_effect("activate_hedge");
        };
        let kind = kind.unwrap_or(HedgeKind::Basic);

        let position_value = self.portfolio.net_directional_dollars();
        let portfolio_value = self.portfolio.equity;
        match plan_activation(kind, position_value, portfolio_value, &self.skill) {
            Ok(plan) => {
                let ticket = HedgeTicket {
                    hedge_size: plan.hedge_size,
                    cost_paid: plan.cost_paid,
                    exposure_fraction: plan.exposure_fraction,
                    beta: plan.beta,
                    hedges_position_id: None,
                };
                match self
                    .portfolio
                    .open_hedge(ticket, cursor.price, cursor.index, cursor.timestamp)
                {
                    Some(position_id) => {
                        self.skill
                            .register(&plan, position_id, cursor.price, cursor.index);
                        self.portfolio.recompute(cursor.price);
                        EngineEvent::hedge_activated(&plan, position_id)
                    }
                    None => EngineEvent::no_effect("activate_hedge"),
                }
            }
            Err(rejection) => {
                self.skill.last_message = Some(rejection.to_string());
                EngineEvent::hedge_rejected(kind, rejection)
            }
        }
    }
}
