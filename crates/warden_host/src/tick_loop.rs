use std::future::Future;
use std::time::Duration;

use warden_control::EventSource;

use crate::state::DaemonState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// `max_ticks` reached.
    Completed,
    /// The shutdown future resolved first.
    Interrupted,
}

/// Drive `state` at `ticks_per_sec` until `max_ticks` or `shutdown`.
///
/// A rate of zero or less runs as fast as possible, yielding between ticks.
pub async fn run_tick_loop<S, F>(
    state: &mut DaemonState<S>,
    ticks_per_sec: f64,
    max_ticks: Option<u64>,
    shutdown: F,
) -> LoopExit
where
    S: EventSource,
    F: Future<Output = ()>,
{
    let mut interval = if ticks_per_sec > 0.0 {
        let mut iv = tokio::time::interval(Duration::from_secs_f64(1.0 / ticks_per_sec));
        iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
        Some(iv)
    } else {
        None
    };
    tokio::pin!(shutdown);

    loop {
        let report = state.step();
        for fault in &report.faults {
            tracing::error!(tick = report.tick, %fault, "task fault");
        }
        if report.cancelled > 0 || report.rejected > 0 {
            tracing::debug!(
                tick = report.tick,
                cancelled = report.cancelled,
                rejected = report.rejected,
                "inputs held back"
            );
        }

        if max_ticks.is_some_and(|max| state.current_tick() >= max) {
            return LoopExit::Completed;
        }

        let pause = async {
            if let Some(ref mut iv) = interval {
                iv.tick().await;
            } else {
                tokio::task::yield_now().await;
            }
        };
        tokio::select! {
            () = &mut shutdown => return LoopExit::Interrupted,
            () = pause => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{ReleaseSlot, ReleaseStatus};
    use warden_control::{Input, MemoryHost, ScriptedSession, ScriptedStep};
    use warden_core::test_fixtures::{base_config, entity_ref};
    use warden_core::{DestinationStore, Dispatcher, Location, NotifyKind, TaskKind};

    fn daemon(steps: Vec<ScriptedStep>, release: Option<ReleaseSlot>) -> DaemonState<ScriptedSession> {
        let dispatcher = Dispatcher::initialize(
            "1.20.4",
            base_config(),
            MemoryHost::new(),
            DestinationStore::new(),
        )
        .unwrap();
        DaemonState::new(dispatcher, ScriptedSession::new(steps), release)
    }

    fn connect_admin() -> ScriptedStep {
        ScriptedStep {
            at_tick: 0,
            input: Input::Connect {
                entity: entity_ref(1, "admin"),
                at: Location::new("world", 0.0, 64.0, 0.0),
                permissions: vec!["warden.update.notify".to_string()],
            },
        }
    }

    #[tokio::test]
    async fn test_loop_stops_at_max_ticks() {
        let mut state = daemon(vec![connect_admin()], None);
        let exit = run_tick_loop(&mut state, 0.0, Some(50), std::future::pending()).await;
        assert_eq!(exit, LoopExit::Completed);
        assert_eq!(state.current_tick(), 50);
        assert_eq!(state.dispatcher.active_tasks(TaskKind::RosterHide), 1);
    }

    #[tokio::test]
    async fn test_shutdown_future_interrupts() {
        let mut state = daemon(vec![], None);
        let exit = run_tick_loop(&mut state, 0.0, None, async {}).await;
        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(state.current_tick(), 1);
    }

    #[tokio::test]
    async fn test_release_notice_is_handed_to_the_dispatcher() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let mut state = daemon(vec![connect_admin()], Some(ReleaseSlot::new(rx)));
        run_tick_loop(&mut state, 0.0, Some(5), std::future::pending()).await;
        assert!(state.dispatcher.release_notice().is_none());

        tx.send(ReleaseStatus::Available("99.0.0".to_string()))
            .unwrap();
        run_tick_loop(&mut state, 0.0, Some(6), std::future::pending()).await;
        assert!(state
            .dispatcher
            .release_notice()
            .is_some_and(|notice| notice.contains("99.0.0")));

        let admin = entity_ref(1, "admin").id;
        let info = state
            .dispatcher
            .host()
            .notifications()
            .iter()
            .filter(|n| n.entity == admin && n.kind == NotifyKind::Info)
            .count();
        assert_eq!(info, 1);
    }
}
