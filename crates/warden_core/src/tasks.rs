//! Per-entity periodic task engine.
//!
//! Holds at most one handle per `(entity, kind)`. Handles are visited in
//! registration order on every `tick`; a callback fires once every
//! `interval` ticks counted from its registration. Callbacks get mutable
//! access to a caller-supplied context and decide their own fate by
//! returning `TaskControl::Cancel` (the self-terminating pattern).

use std::panic::{catch_unwind, AssertUnwindSafe};

use indexmap::IndexMap;

use crate::{EntityId, Rejection, TaskFault, TaskKey, TaskKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Cancel,
}

/// `Err` carries a human-readable reason and is treated as a callback fault.
pub type TaskResult = Result<TaskControl, String>;

pub type TaskCallback<C> = Box<dyn FnMut(&mut C, TaskKey) -> TaskResult>;
pub type CancelHook<C> = Box<dyn FnOnce(&mut C, TaskKey)>;

struct TaskHandle<C> {
    interval: u32,
    remaining: u32,
    callback: TaskCallback<C>,
    on_cancel: Option<CancelHook<C>>,
}

pub struct TaskRegistry<C> {
    handles: IndexMap<TaskKey, TaskHandle<C>, ahash::RandomState>,
}

impl<C> Default for TaskRegistry<C> {
    fn default() -> Self {
        Self {
            handles: IndexMap::with_hasher(ahash::RandomState::new()),
        }
    }
}

impl<C> std::fmt::Debug for TaskRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("active", &self.handles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<C> TaskRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a periodic callback for `key`.
    ///
    /// If a handle already exists the call changes nothing: the existing
    /// handle keeps its schedule and the new closures are dropped.
    pub fn start(
        &mut self,
        key: TaskKey,
        interval_ticks: u32,
        callback: TaskCallback<C>,
        on_cancel: Option<CancelHook<C>>,
    ) -> Result<(), Rejection> {
        if self.handles.contains_key(&key) {
            return Err(Rejection::DuplicateTask(key));
        }
        let interval = interval_ticks.max(1);
        tracing::debug!(task = %key, interval, "task started");
        self.handles.insert(
            key,
            TaskHandle {
                interval,
                remaining: interval,
                callback,
                on_cancel,
            },
        );
        Ok(())
    }

    /// Remove `key`, running its cancel hook once. Returns false if absent.
    pub fn cancel(&mut self, key: TaskKey, ctx: &mut C) -> bool {
        let Some(handle) = self.handles.shift_remove(&key) else {
            return false;
        };
        tracing::debug!(task = %key, "task cancelled");
        if let Some(hook) = handle.on_cancel {
            hook(ctx, key);
        }
        true
    }

    /// Cancel every task kind held by `entity`. Returns how many were removed.
    pub fn cancel_entity(&mut self, entity: EntityId, ctx: &mut C) -> usize {
        TaskKind::ALL
            .iter()
            .filter(|kind| self.cancel(TaskKey::new(entity, **kind), ctx))
            .count()
    }

    /// Cancel everything, in registration order.
    pub fn cancel_all(&mut self, ctx: &mut C) -> usize {
        let keys: Vec<TaskKey> = self.handles.keys().copied().collect();
        keys.into_iter().filter(|key| self.cancel(*key, ctx)).count()
    }

    /// Cancel every handle of one kind, across all entities.
    pub fn cancel_kind(&mut self, kind: TaskKind, ctx: &mut C) -> usize {
        let keys: Vec<TaskKey> = self
            .handles
            .keys()
            .filter(|key| key.kind == kind)
            .copied()
            .collect();
        keys.into_iter().filter(|key| self.cancel(*key, ctx)).count()
    }

    pub fn is_active(&self, key: TaskKey) -> bool {
        self.handles.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn count_kind(&self, kind: TaskKind) -> usize {
        self.handles.keys().filter(|key| key.kind == kind).count()
    }

    /// Advance every handle by one tick and fire those that are due.
    ///
    /// A callback that returns `Err` or panics is logged, cancelled, and
    /// reported in the returned list; the remaining handles still run.
    pub fn tick(&mut self, ctx: &mut C) -> Vec<TaskFault> {
        let mut finished: Vec<TaskKey> = Vec::new();
        let mut faults: Vec<TaskFault> = Vec::new();

        for idx in 0..self.handles.len() {
            let Some((key, handle)) = self.handles.get_index_mut(idx) else {
                break;
            };
            let key = *key;
            handle.remaining = handle.remaining.saturating_sub(1);
            if handle.remaining > 0 {
                continue;
            }
            handle.remaining = handle.interval;

            let callback = &mut handle.callback;
            match catch_unwind(AssertUnwindSafe(|| callback(ctx, key))) {
                Ok(Ok(TaskControl::Continue)) => {}
                Ok(Ok(TaskControl::Cancel)) => finished.push(key),
                Ok(Err(reason)) => {
                    tracing::error!(task = %key, %reason, "task callback failed");
                    faults.push(TaskFault::Failed { key, reason });
                    finished.push(key);
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(task = %key, %message, "task callback panicked");
                    faults.push(TaskFault::Panicked { key, message });
                    finished.push(key);
                }
            }
        }

        for key in finished {
            self.cancel(key, ctx);
        }
        faults
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
