use crate::events::EngineEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLogEventKind {
    TickProcessed,
    PositionOpened,
    PositionClosed,
    AllPositionsClosed,
    HedgeActivated,
    HedgeRejected,
    HedgeExpired,
    CommandIgnored,
    ReplayArtifactWritten,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogEvent {
    pub tick: u64,
    pub kind: RunLogEventKind,
    pub detail: Option<String>,
}

impl RunLogEvent {
    pub fn new(tick: u64, kind: RunLogEventKind, detail: Option<String>) -> Self {
        Self { tick, kind, detail }
    }
}

pub trait RunLogWriter {
    fn write(&mut self, event: RunLogEvent);
}

#[derive(Debug, Default)]
pub struct InMemoryRunLogWriter {
    events: Vec<RunLogEvent>,
}

impl InMemoryRunLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunLogEvent] {
        &self.events
    }
}

impl RunLogWriter for InMemoryRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        self.events.push(event);
    }
}

/// Journals one engine event at the tick it occurred on.
pub fn journal_engine_event(writer: &mut dyn RunLogWriter, tick: u64, event: &EngineEvent) {
    let (kind, detail) = match event {
        EngineEvent::PositionOpened {
            position_id,
            direction,
            size_in_dollars,
            leverage,
        } => (
            RunLogEventKind::PositionOpened,
            format!(
                "{}:{}@{:.2}x{}",
                position_id,
                direction.as_str(),
                size_in_dollars,
                leverage
            ),
        ),
        EngineEvent::PositionClosed {
            position_id,
            realized_pnl,
            holding_period,
        } => (
            RunLogEventKind::PositionClosed,
            format!("{position_id}:pnl={realized_pnl:.2}:held={holding_period}"),
        ),
        EngineEvent::AllPositionsClosed { closed_count } => (
            RunLogEventKind::AllPositionsClosed,
            format!("count={closed_count}"),
        ),
        EngineEvent::HedgeActivated {
            kind,
            position_id,
            hedge_size,
            cost_paid,
            ..
        } => (
            RunLogEventKind::HedgeActivated,
            format!("{kind}:{position_id}@{hedge_size:.2}-{cost_paid:.2}"),
        ),
        EngineEvent::HedgeRejected { kind, reason, .. } => (
            RunLogEventKind::HedgeRejected,
            format!("{kind}:{reason}"),
        ),
        EngineEvent::HedgeExpired {
            kind,
            position_id,
            was_useful,
            ..
        } => (
            RunLogEventKind::HedgeExpired,
            format!("{kind}:{position_id}:useful={was_useful}"),
        ),
        EngineEvent::NoEffect { command } => {
            (RunLogEventKind::CommandIgnored, command.clone())
        }
    };

    writer.write(RunLogEvent::new(tick, kind, Some(detail)));
}
