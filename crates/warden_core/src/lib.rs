//! `warden_core`: tick-driven entity behaviors for an embedding host.
//!
//! No IO, no network. The host is reached only through the `Host` trait and
//! every mutation happens on the caller's tick thread.

mod admin;
mod bundle;
pub mod capability;
pub mod condition;
mod destination;
mod dispatcher;
mod effects;
mod error;
mod freeze;
mod host;
pub mod tasks;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use bundle::{CapabilityBundle, EquipmentSignal};
pub use capability::detect;
pub use condition::{derive_rule, eligible};
pub use destination::{resolve, DestinationStore};
pub use dispatcher::Dispatcher;
pub use effects::Services;
pub use error::{DispatchError, Rejection, TaskFault};
pub use freeze::{FreezeController, FreezeSession, MovementSuppression, StepOutcome};
pub use host::Host;
pub use tasks::{TaskControl, TaskRegistry};
pub use types::*;

#[cfg(test)]
mod tests;
