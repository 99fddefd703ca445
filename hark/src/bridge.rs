//! The single point where Hark talks to a host.

use hark_core::{
    DispatchTableResolver, EventKind, Executor, HostAccessError, Priority, Registration,
    SubscriberId,
};
use std::{fmt, sync::Arc};
use tracing::{debug, trace};

/// Installs executors into the host's dispatch tables.
///
/// The bridge owns nothing but the resolver. It does not remember what it
/// installed; revocation goes through [`DispatchTableResolver::unregister_all`].
#[derive(Clone)]
pub struct RegistrationBridge {
    resolver: Arc<dyn DispatchTableResolver>,
}

impl RegistrationBridge {
    /// Create a bridge over `resolver`.
    pub fn new(resolver: Arc<dyn DispatchTableResolver>) -> Self {
        Self { resolver }
    }

    /// Appends one registration to the table that serves `kind`.
    ///
    /// Fails without side effects when the table cannot be resolved.
    pub fn install(
        &self,
        kind: &EventKind,
        priority: Priority,
        ignore_cancelled: bool,
        executor: Arc<dyn Executor>,
        subscriber: &SubscriberId,
    ) -> Result<(), HostAccessError> {
        let table = self.resolver.resolve(kind)?;
        table.register(Registration::new(
            subscriber.clone(),
            executor,
            priority,
            ignore_cancelled,
        ));

        debug!(
            kind = kind.name(),
            %priority,
            ignore_cancelled,
            subscriber = %subscriber,
            "installed registration"
        );
        Ok(())
    }

    /// Removes every registration `subscriber` owns, in every table.
    pub fn unregister_all(&self, subscriber: &SubscriberId) -> usize {
        let removed = self.resolver.unregister_all(subscriber);
        trace!(subscriber = %subscriber, removed, "unregistered subscriber");
        removed
    }
}

impl fmt::Debug for RegistrationBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationBridge").finish_non_exhaustive()
    }
}
