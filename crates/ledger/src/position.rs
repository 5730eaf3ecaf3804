use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Asset,
    Index,
}

/// One open leveraged exposure. `size_in_dollars` is fixed at entry; only the
/// mark fields change afterwards, and only through `mark_to_market`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub id: u64,
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_index: u64,
    pub entry_time: i64,
    pub size: f64,
    pub size_in_dollars: f64,
    pub current_price: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
    pub leverage: f64,
    pub instrument: Instrument,
    pub is_hedge: bool,
    pub beta: Option<f64>,
    pub hedges_position_id: Option<u64>,
}

impl Position {
    /// Recomputes the mark fields against `current_price`. Entry price is
    /// validated at open time, so no error conditions exist here.
    pub fn mark_to_market(&mut self, current_price: f64) {
        let price_diff_pct = (current_price - self.entry_price) / self.entry_price;
        self.unrealized_pnl_pct = price_diff_pct * 100.0 * self.direction.sign() * self.leverage;
        self.unrealized_pnl = self.size_in_dollars * self.unrealized_pnl_pct / 100.0;
        self.current_price = current_price;
    }
}

/// Immutable record of a closed position. Append-only, owned by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedPosition {
    pub id: u64,
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_index: u64,
    pub entry_time: i64,
    pub size: f64,
    pub size_in_dollars: f64,
    pub leverage: f64,
    pub instrument: Instrument,
    pub is_hedge: bool,
    pub beta: Option<f64>,
    pub hedges_position_id: Option<u64>,
    pub exit_price: f64,
    pub exit_index: u64,
    pub realized_pnl: f64,
    pub realized_pnl_pct: f64,
    pub holding_period: u64,
}

impl ClosedPosition {
    pub fn from_marked(position: &Position, exit_index: u64) -> Self {
        Self {
            id: position.id,
            direction: position.direction,
            entry_price: position.entry_price,
            entry_index: position.entry_index,
            entry_time: position.entry_time,
            size: position.size,
            size_in_dollars: position.size_in_dollars,
            leverage: position.leverage,
            instrument: position.instrument,
            is_hedge: position.is_hedge,
            beta: position.beta,
            hedges_position_id: position.hedges_position_id,
            exit_price: position.current_price,
            exit_index,
            realized_pnl: position.unrealized_pnl,
            realized_pnl_pct: position.unrealized_pnl_pct,
            holding_period: exit_index.saturating_sub(position.entry_index),
        }
    }
}
