use std::io::{self, Write};

use ledger::PortfolioState;

use crate::logging::{RunLogEvent, RunLogEventKind, RunLogWriter};
use crate::tick::BacktestTick;

pub const REPLAY_CSV_HEADER: &str = "index,timestamp,price,portfolio_value,accumulated_return,\
terrain_height,rsi,atr,trend,market_drawdown,regime,cash,stress,open_positions\n";

/// Writes one replay row per processed tick so a run can be inspected or
/// re-rendered offline.
pub struct ReplayCsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReplayCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(REPLAY_CSV_HEADER.as_bytes())
    }

    pub fn write_header_and_log(
        &mut self,
        tick: u64,
        run_log_writer: &mut dyn RunLogWriter,
    ) -> io::Result<()> {
        self.write_header()?;
        self.writer.flush()?;
        run_log_writer.write(RunLogEvent::new(
            tick,
            RunLogEventKind::ReplayArtifactWritten,
            None,
        ));
        Ok(())
    }

    pub fn append_tick(
        &mut self,
        record: &BacktestTick,
        portfolio: &PortfolioState,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.index,
            record.timestamp,
            record.price,
            record.portfolio_value,
            record.accumulated_return,
            record.terrain_height,
            record.rsi,
            record.atr,
            record.trend,
            record.market_drawdown,
            record.regime.as_str(),
            portfolio.cash,
            portfolio.stress_level,
            portfolio.positions.len(),
        )
    }
}
