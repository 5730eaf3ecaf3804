use std::fmt;

use crate::kind::{HedgeKind, HedgeSpec};
use crate::state::SkillState;

/// Positions below this notional are not worth hedging.
pub const MIN_HEDGE_NOTIONAL: f64 = 100.0;
/// Activation cost may not exceed this fraction of portfolio value.
pub const HEDGE_BUDGET_CAP: f64 = 0.05;
/// Transaction-cost floor that skill discounts cannot erase.
pub const HEDGE_COST_FLOOR_RATE: f64 = 0.001;

/// A validated activation: everything the ledger needs to open the backing
/// short and everything the skill state needs to track it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgePlan {
    pub kind: HedgeKind,
    pub beta: f64,
    pub hedge_size: f64,
    pub cost_paid: f64,
    pub duration: u32,
    pub exposure_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeRejection {
    Locked,
    Cooldown,
    MaxHedges,
    NoPosition,
    InsufficientFunds,
}

impl HedgeRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Cooldown => "cooldown",
            Self::MaxHedges => "max_hedges",
            Self::NoPosition => "no_position",
            Self::InsufficientFunds => "insufficient_funds",
        }
    }
}

impl fmt::Display for HedgeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "hedge type is locked at the current player level"),
            Self::Cooldown => write!(f, "hedge cooldown has not elapsed yet"),
            Self::MaxHedges => write!(f, "maximum number of concurrent hedges reached"),
            Self::NoPosition => write!(f, "no position large enough to hedge"),
            Self::InsufficientFunds => write!(f, "hedge cost exceeds the portfolio budget"),
        }
    }
}

/// Validates an activation request and sizes the hedge. The checks run in a
/// fixed order and the first failure wins, so rejection reasons are
/// deterministic for any given state.
pub fn plan_activation(
    kind: HedgeKind,
    position_value: f64,
    portfolio_value: f64,
    skill: &SkillState,
) -> Result<HedgePlan, HedgeRejection> {
    let spec = kind.spec();

    if skill.player_level < spec.unlock_level {
        return Err(HedgeRejection::Locked);
    }
    if skill.hedge_cooldown > 0 {
        return Err(HedgeRejection::Cooldown);
    }
    if skill.active_hedges.len() >= skill.max_hedges {
        return Err(HedgeRejection::MaxHedges);
    }
    if position_value.abs() < MIN_HEDGE_NOTIONAL {
        return Err(HedgeRejection::NoPosition);
    }

    let hedge_size = position_value.abs() * spec.beta;
    let cost_paid = hedge_size * effective_cost_rate(&spec, skill.hedge_cost_reduction);
    if cost_paid > portfolio_value * HEDGE_BUDGET_CAP {
        return Err(HedgeRejection::InsufficientFunds);
    }

    Ok(HedgePlan {
        kind,
        beta: spec.beta,
        hedge_size,
        cost_paid,
        duration: spec.duration,
        // portfolio_value is strictly positive here: a non-positive value
        // cannot clear the budget check above.
        exposure_fraction: hedge_size / portfolio_value,
    })
}

fn effective_cost_rate(spec: &HedgeSpec, cost_reduction: f64) -> f64 {
    (spec.cost_rate - cost_reduction).max(HEDGE_COST_FLOOR_RATE)
}
