//! # hark - Declarative listener pipelines
//!
//! `hark` composes event listeners on top of a host's typed dispatch tables.
//! A pipeline is a chain of predicates followed by a consumer or a
//! cancellation; the builders below turn it into executors and install them
//! through a [`DispatchTableResolver`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hark::prelude::*;
//! use hark::EventBus;
//!
//! let bus = Arc::new(EventBus::new());
//! let registrar = Registrar::new("greeter", bus.clone());
//!
//! // One kind
//! registrar
//!     .handle_event::<Join>()
//!     .filter(|join| !join.player.is_op)
//!     .handle(|join| join.message = None)?;
//!
//! // Several kinds sharing a supertype
//! registrar
//!     .handle_events::<dyn PlayerEvent>()
//!     .from::<Break>()
//!     .from::<BucketFill>()
//!     .filter(|event| !event.player().is_op)
//!     .cancel()?;
//!
//! // A value projected from several kinds
//! registrar
//!     .handle_bundle::<String>()
//!     .from::<Join>(|join| join.player.name.clone())
//!     .from::<Quit>(|quit| quit.player.name.clone())
//!     .handle_value(|name| println!("{name}"))?;
//! ```
//!
//! ## Feature Flags
//!
//! - `macros`: `#[derive(Event)]`

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bridge;
mod handler;
mod predicate;
mod registrar;

pub use bridge::RegistrationBridge;
pub use handler::{
    BundleHandler, HandlerBuilder, HandlerState, MultiKindHandler, SingleKindHandler,
};
pub use predicate::{BiPredicate, Predicate};
pub use registrar::Registrar;

pub use hark_core::{
    // Errors
    BoxError,
    // Event model
    Cancellable,
    DispatchFailure,
    // Host contract
    DispatchTableResolver,
    Event,
    EventKind,
    EventType,
    // Executors
    Executor,
    Extends,
    HandlerList,
    HarkError,
    HostAccessError,
    IntoOutcome,
    InvalidConfiguration,
    ParsePriorityError,
    Priority,
    Registration,
    RegistrationError,
    SubscriberId,
    TypedExecutor,
};

// Reference host
pub use hark_std::{DispatchReport, EventBus, EventBusBuilder, Table};

/// Stateless filters and consumers.
pub mod defaults {
    pub use hark_std::defaults::{filters, handlers};
}

/// Testing utilities.
pub mod testing {
    pub use hark_std::testing::{BrokenResolver, CallCounter, Recorder};
}

/// Prelude module - common imports for Hark.
///
/// # Usage
///
/// ```rust,ignore
/// use hark::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Event model
        Cancellable,
        Event,
        EventType,
        Extends,
        // Builders
        HandlerBuilder,
        Priority,
        Registrar,
        RegistrationError,
    };
}

#[cfg(feature = "macros")]
pub use hark_macros::Event;
