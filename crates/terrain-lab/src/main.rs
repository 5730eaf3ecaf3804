mod config;
mod dataset;
mod script;

use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

use ledger::LedgerConfig;
use runtime::engine::{Session, SessionConfig};
use runtime::logging::{
    journal_engine_event, InMemoryRunLogWriter, RunLogEvent, RunLogEventKind, RunLogWriter,
};
use runtime::replay::ReplayCsvWriter;
use script::ScriptAction;

fn main() -> Result<(), Box<dyn Error>> {
    let config = config::Config::from_env()?;
    let dataset = dataset::load_dataset(&config.candles_path)?;

    let mut journal = InMemoryRunLogWriter::new();
    let mut replay_writer = create_replay_writer(&config.replay_output_path)?;
    replay_writer.write_header_and_log(0, &mut journal)?;

    let mut session = Session::new(SessionConfig {
        ledger: LedgerConfig {
            initial_capital: config.initial_capital,
            max_leverage: config.max_leverage,
        },
        player_level: config.player_level,
        ..SessionConfig::default()
    });

    for index in 0..dataset.candles.len() {
        let Some(outcome) = session.advance(&dataset.candles, index, dataset.timestamps[index])
        else {
            continue;
        };
        let tick = outcome.record.index;
        journal.write(RunLogEvent::new(tick, RunLogEventKind::TickProcessed, None));
        for event in &outcome.events {
            journal_engine_event(&mut journal, tick, event);
        }

        replay_writer.append_tick(&outcome.record, session.portfolio())?;

        let action = script::decide(
            outcome.record.regime,
            session.portfolio().has_open_directional_positions(),
            !session.skill().active_hedges.is_empty(),
        );
        let command_event = match action {
            ScriptAction::OpenLong { size_fraction } => {
                Some(session.open_long(size_fraction, None))
            }
            ScriptAction::CloseAll => Some(session.close_all()),
            ScriptAction::ActivateHedge { kind } => Some(session.activate_hedge(Some(kind))),
            ScriptAction::Hold => None,
        };
        if let Some(event) = command_event {
            journal_engine_event(&mut journal, tick, &event);
        }
    }

    let summary = session.summary();
    let portfolio = session.portfolio();
    println!(
        "ticks={} equity={:.2} cash={:.2} realized_pnl={:.2} max_drawdown={:.4} trades={} win_rate={:.2} journal_events={}",
        session.ticks().len(),
        summary.equity,
        portfolio.cash,
        summary.total_realized_pnl,
        summary.max_drawdown,
        summary.trade_count,
        summary.win_rate,
        journal.events().len(),
    );

    Ok(())
}

fn create_replay_writer(path: &str) -> Result<ReplayCsvWriter<File>, std::io::Error> {
    let replay_path = Path::new(path);

    if let Some(parent) = replay_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    Ok(ReplayCsvWriter::new(File::create(replay_path)?))
}
