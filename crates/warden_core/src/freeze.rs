//! Countdown freeze sessions.
//!
//! `Idle` is the absence of a session. `begin` moves an entity to
//! `Counting`; each `step` consumes one tick, feedback goes out every
//! `step_ticks` ticks, and the final step performs the relocation (for
//! `AtEnd`) and deletes the session. `AtStart` relocates on the first step.
//! `release` is the forced exit: no relocation, no terminal feedback.

use ahash::AHashMap;

use crate::{
    EntityId, EventOutcome, Host, Location, NotifyKind, Rejection, TeleportTiming,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FreezeSession {
    pub destination: Location,
    pub remaining: u32,
    pub timing: TeleportTiming,
    pub created_tick: u64,
    /// Ticks between two feedback messages.
    pub step_ticks: u32,
    /// Where the entity is held. Only the session itself moves this.
    pub anchor: Option<Location>,
    elapsed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Counting { remaining: u32 },
    Released,
}

/// How a Tier expresses "this movement did not happen".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementSuppression {
    /// Cancel the move event outright.
    Cancel,
    /// Let the event through and put the entity back at its anchor.
    ResetPosition,
}

#[derive(Debug, Default)]
pub struct FreezeController {
    sessions: AHashMap<EntityId, FreezeSession>,
}

impl FreezeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session. A second request for a counting entity is rejected,
    /// never queued.
    pub fn begin(
        &mut self,
        entity: EntityId,
        destination: Location,
        duration: u32,
        step_ticks: u32,
        timing: TeleportTiming,
        now_tick: u64,
        anchor: Option<Location>,
    ) -> Result<(), Rejection> {
        if self.sessions.contains_key(&entity) {
            return Err(Rejection::AlreadyFrozen(entity));
        }
        tracing::debug!(%entity, duration, ?timing, "freeze session opened");
        self.sessions.insert(
            entity,
            FreezeSession {
                destination,
                remaining: duration.max(1),
                timing,
                created_tick: now_tick,
                step_ticks: step_ticks.max(1),
                anchor,
                elapsed: 0,
            },
        );
        Ok(())
    }

    pub fn is_frozen(&self, entity: EntityId) -> bool {
        self.sessions.contains_key(&entity)
    }

    pub fn session(&self, entity: EntityId) -> Option<&FreezeSession> {
        self.sessions.get(&entity)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop the session without relocating or emitting terminal feedback.
    pub fn release(&mut self, entity: EntityId) -> Option<FreezeSession> {
        let session = self.sessions.remove(&entity);
        if session.is_some() {
            tracing::debug!(%entity, "freeze session released early");
        }
        session
    }

    /// Drop every session; used on shutdown.
    pub fn clear(&mut self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        count
    }

    /// Consume one tick of the countdown for `entity`.
    pub fn step(&mut self, entity: EntityId, host: &mut dyn Host) -> StepOutcome {
        let Some(session) = self.sessions.get_mut(&entity) else {
            return StepOutcome::Released;
        };

        let first = session.elapsed == 0;
        session.elapsed += 1;
        session.remaining = session.remaining.saturating_sub(1);

        if first && session.timing == TeleportTiming::AtStart {
            host.teleport(entity, &session.destination);
            session.anchor = Some(session.destination.clone());
        }

        if session.remaining > 0 {
            let remaining = session.remaining;
            if session.elapsed.is_multiple_of(session.step_ticks) {
                host.notify(
                    entity,
                    &format!("Teleporting in {remaining}..."),
                    NotifyKind::FeedbackTick,
                );
            }
            return StepOutcome::Counting { remaining };
        }

        if let Some(session) = self.sessions.remove(&entity) {
            if session.timing == TeleportTiming::AtEnd {
                host.teleport(entity, &session.destination);
            }
            host.notify(entity, "Teleported.", NotifyKind::Info);
            tracing::debug!(%entity, "freeze session completed");
        }
        StepOutcome::Released
    }

    /// Neutralise a movement delta for a counting entity.
    ///
    /// Returns `None` when the entity is not frozen or did not actually move.
    pub fn suppress_move(
        &self,
        entity: EntityId,
        from: &Location,
        to: &Location,
        mode: MovementSuppression,
    ) -> Option<EventOutcome> {
        let session = self.sessions.get(&entity)?;
        let hold = session.anchor.as_ref().unwrap_or(from);
        if hold.same_position(to) {
            return None;
        }
        Some(match mode {
            MovementSuppression::Cancel => EventOutcome::Cancel,
            MovementSuppression::ResetPosition => EventOutcome::ResetPosition(hold.clone()),
        })
    }
}
