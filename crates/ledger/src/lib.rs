pub mod config;
pub mod portfolio;
pub mod position;

pub use config::LedgerConfig;
pub use portfolio::{recovery_needed_pct, HedgeTicket, LedgerSummary, PortfolioState};
pub use position::{ClosedPosition, Direction, Instrument, Position};
