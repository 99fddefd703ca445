//! # hark-core
//!
//! Core event model and host contract for the Hark listener composition engine.
//!
//! This crate has minimal dependencies and is designed to be imported by host
//! integrations that only need to implement [`DispatchTableResolver`] or
//! describe their events, without pulling in the builders from `hark`.
//!
//! # Layers
//!
//! ## Event model ([`Event`], [`EventType`], [`Cancellable`], [`Extends`])
//!
//! Host events are opaque records. Hark needs a runtime type tag to refuse
//! events of the wrong kind, a static description of each kind, the optional
//! cancellation capability and membership in supertypes.
//!
//! ## Executors ([`Executor`], [`TypedExecutor`])
//!
//! What the host actually stores and invokes. A [`TypedExecutor`] checks the
//! runtime kind before downcasting and turns failures into
//! [`DispatchFailure`] values so they never unwind into the host.
//!
//! ## Host contract ([`DispatchTableResolver`], [`HandlerList`], [`Registration`])
//!
//! The only way Hark touches the host: resolve the table for a kind, append a
//! registration, revoke everything a subscriber installed.
//!
//! # Error Types
//!
//! - [`HarkError`] - Top-level error type
//! - [`InvalidConfiguration`] - Pipelines that cannot be registered
//! - [`HostAccessError`] - Dispatch table resolution failures
//! - [`DispatchFailure`] - Per-event handler failures
//! - [`RegistrationError`] - Terminal operation failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod executor;
mod outcome;
mod priority;
mod subscriber;
mod table;

// Re-exports
pub use error::{
    BoxError, DispatchFailure, HarkError, HostAccessError, InvalidConfiguration,
    RegistrationError,
};
pub use event::{Cancellable, Event, EventKind, EventType, Extends};
pub use executor::{Executor, TypedExecutor};
pub use outcome::IntoOutcome;
pub use priority::{ParsePriorityError, Priority};
pub use subscriber::SubscriberId;
pub use table::{DispatchTableResolver, HandlerList, Registration};
