use hedge::HedgeKind;
use market::Regime;

const SCRIPT_LONG_SIZE: f64 = 0.25;

/// One scripted step of the demo replay. The script stands in for the
/// out-of-scope UI: it issues the same commands a player would.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptAction {
    OpenLong { size_fraction: f64 },
    CloseAll,
    ActivateHedge { kind: HedgeKind },
    Hold,
}

/// Deterministic regime-reactive policy: ride bull markets, step aside in
/// bear markets, buy crash protection while a crash lasts.
pub fn decide(regime: Regime, has_open_positions: bool, has_active_hedge: bool) -> ScriptAction {
    match regime {
        Regime::Bull if !has_open_positions => ScriptAction::OpenLong {
            size_fraction: SCRIPT_LONG_SIZE,
        },
        Regime::Bear if has_open_positions => ScriptAction::CloseAll,
        Regime::Crash if has_open_positions && !has_active_hedge => ScriptAction::ActivateHedge {
            kind: HedgeKind::Basic,
        },
        _ => ScriptAction::Hold,
    }
}
