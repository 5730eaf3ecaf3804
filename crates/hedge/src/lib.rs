pub mod activation;
pub mod expiry;
pub mod kind;
pub mod state;

pub use activation::{
    plan_activation, HedgePlan, HedgeRejection, HEDGE_BUDGET_CAP, HEDGE_COST_FLOOR_RATE,
    MIN_HEDGE_NOTIONAL,
};
pub use expiry::{process_tick, ExpiredHedge, HedgeTickReport};
pub use kind::{HedgeKind, HedgeSpec};
pub use state::{HedgeState, SkillState};
