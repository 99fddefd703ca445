//! Handler builders.
//!
//! Every builder accumulates the same three settings before a terminal
//! operation turns it into registrations:
//!
//! - a [`Priority`], defaulting to [`Priority::Normal`]
//! - whether the host should skip already-cancelled events
//! - an AND-chain of predicates, see [`crate::Predicate`]
//!
//! The first two are shared through [`HandlerBuilder`]. Predicates are typed
//! by what each builder exposes to user code, so `filter` lives on the
//! concrete builders.
//!
//! Terminal operations consume the builder. Clone it first to register
//! several pipelines from one configuration.

mod bundle;
mod multi;
mod single;

pub use bundle::BundleHandler;
pub use multi::MultiKindHandler;
pub use single::SingleKindHandler;

use hark_core::{BoxError, Event, EventKind, InvalidConfiguration, Priority};

/// Priority and cancellation settings shared by every builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerState {
    priority: Option<Priority>,
    ignore_cancelled: bool,
}

impl HandlerState {
    /// The explicitly chosen priority, if any.
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// The priority a registration will be installed with.
    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    /// Whether the host will skip events that are already cancelled.
    pub fn ignores_cancelled(&self) -> bool {
        self.ignore_cancelled
    }
}

/// Fluent configuration shared by [`SingleKindHandler`],
/// [`MultiKindHandler`] and [`BundleHandler`].
pub trait HandlerBuilder: Sized {
    /// Current settings.
    fn state(&self) -> &HandlerState;

    /// Mutable access for the provided methods.
    #[doc(hidden)]
    fn state_mut(&mut self) -> &mut HandlerState;

    /// Sets the priority.
    fn priority(mut self, priority: Priority) -> Self {
        self.state_mut().priority = Some(priority);
        self
    }

    /// Sets the priority when `priority` is `Some`, otherwise leaves it alone.
    fn maybe_priority(mut self, priority: Option<Priority>) -> Self {
        if let Some(priority) = priority {
            self.state_mut().priority = Some(priority);
        }
        self
    }

    /// Sets whether already-cancelled events are skipped.
    fn set_ignore_cancelled(mut self, ignore: bool) -> Self {
        self.state_mut().ignore_cancelled = ignore;
        self
    }

    /// Skip events that are already cancelled.
    fn ignore_cancelled(self) -> Self {
        self.set_ignore_cancelled(true)
    }

    /// Receive events even when they are already cancelled. This is the default.
    fn accept_cancelled(self) -> Self {
        self.set_ignore_cancelled(false)
    }
}

/// Refuses to build a cancellation pipeline for a kind without the flag.
pub(crate) fn ensure_cancellable(kind: &EventKind) -> Result<(), InvalidConfiguration> {
    if kind.is_cancellable() {
        Ok(())
    } else {
        Err(InvalidConfiguration::NotCancellable { kind: kind.name() })
    }
}

/// Sets the cancelled flag. Never clears it.
pub(crate) fn mark_cancelled<U: Event>(event: &mut U, kind: &'static str) -> Result<(), BoxError> {
    match event.as_cancellable_mut() {
        Some(flag) => {
            flag.set_cancelled(true);
            Ok(())
        }
        None => Err(Box::new(InvalidConfiguration::NotCancellable { kind })),
    }
}
