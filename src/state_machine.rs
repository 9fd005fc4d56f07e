//! Interview session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Failure, Outcome, Settled};
pub use event::{Event, FailureKind};
pub use state::{Message, Operation, SessionContext, SessionState, SessionStatus, Speaker};
pub use transition::{transition, TransitionError, TransitionResult};
