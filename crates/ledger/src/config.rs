#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerConfig {
    pub initial_capital: f64,
    pub max_leverage: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            max_leverage: 3.0,
        }
    }
}
