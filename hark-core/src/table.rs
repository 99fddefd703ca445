//! # Host Dispatch Tables
//!
//! The contract between Hark and the host's event bus. The host owns one
//! ordered list of registrations per event kind and invokes it whenever an
//! event of that kind occurs. Hark reaches those lists only through a
//! [`DispatchTableResolver`] supplied by the host integration layer.

use crate::{
    error::HostAccessError,
    event::{Event, EventKind},
    executor::Executor,
    priority::Priority,
    subscriber::SubscriberId,
};
use std::{fmt, sync::Arc};

/// One entry in a host dispatch table.
#[derive(Clone)]
pub struct Registration {
    subscriber: SubscriberId,
    executor: Arc<dyn Executor>,
    priority: Priority,
    ignore_cancelled: bool,
}

impl Registration {
    /// Creates a registration.
    pub fn new(
        subscriber: SubscriberId,
        executor: Arc<dyn Executor>,
        priority: Priority,
        ignore_cancelled: bool,
    ) -> Self {
        Self {
            subscriber,
            executor,
            priority,
            ignore_cancelled,
        }
    }

    /// The identity this registration is tagged with.
    pub fn subscriber(&self) -> &SubscriberId {
        &self.subscriber
    }

    /// The executor to invoke.
    pub fn executor(&self) -> &dyn Executor {
        &*self.executor
    }

    /// Invocation priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether the host must skip this registration for cancelled events.
    pub fn ignores_cancelled(&self) -> bool {
        self.ignore_cancelled
    }

    /// Whether the host should invoke this registration for `event` in its
    /// current state.
    pub fn accepts(&self, event: &dyn Event) -> bool {
        !(self.ignore_cancelled && event.cancelled())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("subscriber", &self.subscriber)
            .field("priority", &self.priority)
            .field("ignore_cancelled", &self.ignore_cancelled)
            .finish_non_exhaustive()
    }
}

/// The host's ordered list of registrations for one kind.
pub trait HandlerList: Send + Sync {
    /// Appends a registration. No uniqueness check is performed.
    fn register(&self, registration: Registration);

    /// Removes every registration tagged with `subscriber`, returning how many
    /// were removed.
    fn unregister(&self, subscriber: &SubscriberId) -> usize;

    /// Number of registrations in the list.
    fn len(&self) -> usize;

    /// Whether the list is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves the host's dispatch table for a kind.
///
/// Implemented by the host integration layer. Resolution failures are fatal
/// for the registration attempt that triggered them.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot resolve host dispatch tables",
    label = "missing `DispatchTableResolver` implementation",
    note = "Implement `resolve` and `unregister_all` over the host's event bus."
)]
pub trait DispatchTableResolver: Send + Sync {
    /// Returns the list of registrations for `kind`.
    fn resolve(&self, kind: &EventKind) -> Result<Arc<dyn HandlerList>, HostAccessError>;

    /// Removes every registration tagged with `subscriber` across all kinds.
    fn unregister_all(&self, subscriber: &SubscriberId) -> usize;
}

impl<R: DispatchTableResolver + ?Sized> DispatchTableResolver for Arc<R> {
    fn resolve(&self, kind: &EventKind) -> Result<Arc<dyn HandlerList>, HostAccessError> {
        (**self).resolve(kind)
    }

    fn unregister_all(&self, subscriber: &SubscriberId) -> usize {
        (**self).unregister_all(subscriber)
    }
}
