use hedge::{ExpiredHedge, HedgeKind, HedgePlan, HedgeRejection};
use ledger::{ClosedPosition, Direction, Position};

/// Outcome of one player command or hedge lifecycle step, surfaced to the
/// UI/input collaborator. Commands never raise errors: invalid requests come
/// back as `NoEffect`, hedge activation failures as `HedgeRejected`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EngineEvent {
    PositionOpened {
        position_id: u64,
        direction: Direction,
        size_in_dollars: f64,
        leverage: f64,
    },
    PositionClosed {
        position_id: u64,
        realized_pnl: f64,
        holding_period: u64,
    },
    AllPositionsClosed {
        closed_count: usize,
    },
    HedgeActivated {
        kind: String,
        position_id: u64,
        hedge_size: f64,
        cost_paid: f64,
        duration: u32,
    },
    HedgeRejected {
        kind: String,
        reason: String,
        message: String,
    },
    HedgeExpired {
        kind: String,
        position_id: u64,
        exit_price: f64,
        was_useful: bool,
    },
    NoEffect {
        command: String,
    },
}

impl EngineEvent {
    pub fn position_opened(position: &Position) -> Self {
        Self::PositionOpened {
            position_id: position.id,
            direction: position.direction,
            size_in_dollars: position.size_in_dollars,
            leverage: position.leverage,
        }
    }

    pub fn position_closed(closed: &ClosedPosition) -> Self {
        Self::PositionClosed {
            position_id: closed.id,
            realized_pnl: closed.realized_pnl,
            holding_period: closed.holding_period,
        }
    }

    pub fn all_positions_closed(closed_count: usize) -> Self {
        Self::AllPositionsClosed { closed_count }
    }

    pub fn hedge_activated(plan: &HedgePlan, position_id: u64) -> Self {
        Self::HedgeActivated {
            kind: plan.kind.as_str().to_string(),
            position_id,
            hedge_size: plan.hedge_size,
            cost_paid: plan.cost_paid,
            duration: plan.duration,
        }
    }

    pub fn hedge_rejected(kind: HedgeKind, rejection: HedgeRejection) -> Self {
        Self::HedgeRejected {
            kind: kind.as_str().to_string(),
            reason: rejection.as_str().to_string(),
            message: rejection.to_string(),
        }
    }

    pub fn hedge_expired(expired: &ExpiredHedge) -> Self {
        Self::HedgeExpired {
            kind: expired.kind.as_str().to_string(),
            position_id: expired.position_id,
            exit_price: expired.exit_price,
            was_useful: expired.was_useful,
        }
    }

    pub fn no_effect(command: impl Into<String>) -> Self {
        Self::NoEffect {
            command: command.into(),
        }
    }
}
