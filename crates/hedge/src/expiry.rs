use crate::state::SkillState;
use crate::kind::HedgeKind;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpiredHedge {
    pub kind: HedgeKind,
    pub position_id: u64,
    pub exit_price: f64,
    pub was_useful: bool,
}

/// What one tick of hedge processing produced. The caller must close every
/// position in `positions_to_close` against the ledger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HedgeTickReport {
    pub tick: u64,
    pub expired: Vec<ExpiredHedge>,
    pub positions_to_close: Vec<u64>,
}

/// Advances every active hedge by one candle. Hedges reaching zero expire:
/// they leave the active set, their backing position is scheduled for
/// closure, and the global cooldown is refreshed from their type (never below
/// 1, reduced by the skill discount). On ticks with no expiry the cooldown
/// decays by one instead.
///
/// `position_pnl` looks up the current unrealized P&L of a hedge's backing
/// position; it is injected rather than read from any shared state.
pub fn process_tick(
    skill: &mut SkillState,
    current_tick: u64,
    current_price: f64,
    position_pnl: impl Fn(u64) -> Option<f64>,
) -> HedgeTickReport {
    let mut report = HedgeTickReport {
        tick: current_tick,
        ..HedgeTickReport::default()
    };

    let cooldown_reduction = skill.hedge_cooldown_reduction;
    let mut next_cooldown = skill.hedge_cooldown;
    let mut retained = Vec::with_capacity(skill.active_hedges.len());

    for mut hedge in skill.active_hedges.drain(..) {
        hedge.remaining_candles = hedge.remaining_candles.saturating_sub(1);
        if hedge.remaining_candles > 0 {
            retained.push(hedge);
            continue;
        }

        hedge.is_active = false;
        let was_useful = position_pnl(hedge.position_id)
            .map(|pnl| pnl > 0.0)
            .unwrap_or(false);
        let refreshed = hedge
            .kind
            .spec()
            .cooldown
            .saturating_sub(cooldown_reduction)
            .max(1);
        next_cooldown = next_cooldown.max(refreshed);

        report.positions_to_close.push(hedge.position_id);
        report.expired.push(ExpiredHedge {
            kind: hedge.kind,
            position_id: hedge.position_id,
            exit_price: current_price,
            was_useful,
        });
    }

    skill.active_hedges = retained;

    if report.expired.is_empty() && next_cooldown > 0 {
        next_cooldown -= 1;
    }
    skill.hedge_cooldown = next_cooldown;

    report
}
