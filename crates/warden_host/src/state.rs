use warden_control::{run_tick, EventSource, MemoryHost, TickReport};
use warden_core::Dispatcher;

use crate::release::ReleaseSlot;

/// Everything the tick task owns. Never shared across tasks.
pub struct DaemonState<S> {
    pub dispatcher: Dispatcher<MemoryHost>,
    pub source: S,
    pub release: Option<ReleaseSlot>,
    /// Version compared against the release check answer.
    pub running_version: String,
    pub faults: usize,
}

impl<S: EventSource> DaemonState<S> {
    pub fn new(dispatcher: Dispatcher<MemoryHost>, source: S, release: Option<ReleaseSlot>) -> Self {
        Self {
            dispatcher,
            source,
            release,
            running_version: env!("CARGO_PKG_VERSION").to_string(),
            faults: 0,
        }
    }

    /// One tick: pick up a finished release check, deliver due inputs, then
    /// advance the dispatcher.
    pub fn step(&mut self) -> TickReport {
        if let Some(status) = self.release.as_mut().and_then(ReleaseSlot::poll) {
            let notice = status.notice(&self.running_version);
            self.dispatcher.set_release_notice(notice);
        }
        let report = run_tick(&mut self.dispatcher, &mut self.source);
        self.faults += report.faults.len();
        report
    }

    pub fn current_tick(&self) -> u64 {
        self.dispatcher.current_tick()
    }
}
