use thiserror::Error;

use crate::{EntityId, TaskKey};

/// Recoverable refusals handed back to the caller. None of these are faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("task {0} is already active")]
    DuplicateTask(TaskKey),
    #[error("entity {0} already has a countdown in progress")]
    AlreadyFrozen(EntityId),
    #[error("entity {0} is not online")]
    UnknownEntity(EntityId),
    #[error("no destinations registered for '{0}'")]
    NoCandidates(String),
    #[error("candidate list is empty")]
    EmptyCandidates,
    #[error("a destination named '{0}' already exists")]
    DuplicateDestination(String),
    #[error("no destination named '{0}'")]
    UnknownDestination(String),
}

/// A periodic callback that failed. The registry cancels the offending task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFault {
    #[error("callback for {key} failed: {reason}")]
    Failed { key: TaskKey, reason: String },
    #[error("callback for {key} panicked: {message}")]
    Panicked { key: TaskKey, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no capability bundle matches tier {0:?}")]
    NoBundle(crate::Tier),
}
