//! Registrar - the identity registrations are installed under.

use crate::{
    bridge::RegistrationBridge,
    handler::{BundleHandler, HandlerBuilder, MultiKindHandler, SingleKindHandler},
};
use hark_core::{
    DispatchTableResolver, EventKind, EventType, Executor, HostAccessError, Priority,
    RegistrationError, SubscriberId,
};
use std::sync::Arc;

/// Entry point for building pipelines.
///
/// Every registration made through a registrar (or any of its clones) is
/// owned by the same [`SubscriberId`], so [`unregister_all`] revokes them
/// together.
///
/// # Example
///
/// ```rust,ignore
/// let bus = Arc::new(EventBus::new());
/// let registrar = Registrar::new("greeter", bus.clone());
///
/// registrar
///     .handle_event::<Join>()
///     .handle(|join| join.message = Some("welcome".into()))?;
///
/// registrar.unregister_all();
/// ```
///
/// [`unregister_all`]: Registrar::unregister_all
#[derive(Debug, Clone)]
pub struct Registrar {
    subscriber: SubscriberId,
    bridge: RegistrationBridge,
}

impl Registrar {
    /// Create a registrar labelled `label` over `resolver`.
    pub fn new<R>(label: impl Into<Arc<str>>, resolver: R) -> Self
    where
        R: DispatchTableResolver + 'static,
    {
        Self::with_resolver(label, Arc::new(resolver))
    }

    /// Create a registrar over an already shared resolver.
    pub fn with_resolver(
        label: impl Into<Arc<str>>,
        resolver: Arc<dyn DispatchTableResolver>,
    ) -> Self {
        Self {
            subscriber: SubscriberId::new(label),
            bridge: RegistrationBridge::new(resolver),
        }
    }

    /// The identity every registration is installed under.
    pub fn subscriber(&self) -> &SubscriberId {
        &self.subscriber
    }

    /// Start a pipeline over events of kind `U`.
    pub fn handle_event<U: EventType>(&self) -> SingleKindHandler<'_, U> {
        SingleKindHandler::new(self)
    }

    /// Start a pipeline over several kinds, seen through supertype `S`.
    pub fn handle_events<S: ?Sized + 'static>(&self) -> MultiKindHandler<'_, S> {
        MultiKindHandler::new(self)
    }

    /// Start a pipeline over values of type `T` projected from several kinds.
    pub fn handle_bundle<T: 'static>(&self) -> BundleHandler<'_, T> {
        BundleHandler::new(self)
    }

    /// Like [`handle_bundle`](Self::handle_bundle), with the event seen
    /// through supertype `E` instead of `dyn Event`.
    pub fn handle_bundle_of<T: 'static, E: ?Sized + 'static>(&self) -> BundleHandler<'_, T, E> {
        BundleHandler::new(self)
    }

    /// Installs `consumer` for every event of kind `U`.
    pub fn handle<U: EventType>(
        &self,
        priority: Option<Priority>,
        ignore_cancelled: bool,
        consumer: impl Fn(&mut U) + Send + Sync + 'static,
    ) -> Result<&Self, RegistrationError> {
        self.handle_event::<U>()
            .maybe_priority(priority)
            .set_ignore_cancelled(ignore_cancelled)
            .handle(consumer)
    }

    /// Cancels events of kind `U` that pass `predicate`, then runs `after`.
    pub fn cancel<U: EventType>(
        &self,
        priority: Option<Priority>,
        predicate: impl Fn(&U) -> bool + Send + Sync + 'static,
        after: impl Fn(&mut U) + Send + Sync + 'static,
    ) -> Result<&Self, RegistrationError> {
        self.handle_event::<U>()
            .maybe_priority(priority)
            .filter(predicate)
            .cancel_then(after)
    }

    /// Removes every registration this registrar installed.
    ///
    /// Returns how many were removed.
    pub fn unregister_all(&self) -> usize {
        self.bridge.unregister_all(&self.subscriber)
    }

    pub(crate) fn install(
        &self,
        kind: &EventKind,
        priority: Priority,
        ignore_cancelled: bool,
        executor: Arc<dyn Executor>,
    ) -> Result<(), HostAccessError> {
        self.bridge
            .install(kind, priority, ignore_cancelled, executor, &self.subscriber)
    }
}
