//! One pipeline over a value projected out of several kinds.
//!
//! Each source kind carries its own projection `Fn(&U) -> T`. The projection
//! runs once per delivered event; predicates and the consumer then see the
//! projected value next to a view `E` of the event itself.

use super::{HandlerBuilder, HandlerState, mark_cancelled};
use crate::{predicate::BiPredicate, registrar::Registrar};
use hark_core::{
    BoxError, Event, EventKind, EventType, Executor, Extends, IntoOutcome, InvalidConfiguration,
    Priority, RegistrationError, TypedExecutor,
};
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

type BiShared<T, E> = Arc<dyn Fn(&T, &mut E) -> Result<(), BoxError> + Send + Sync>;

/// Builds executors for one source kind.
trait Source<T, E: ?Sized>: Send + Sync {
    fn handle(&self, predicate: BiPredicate<T, E>, consumer: BiShared<T, E>) -> Arc<dyn Executor>;

    fn cancel(&self, predicate: BiPredicate<T, E>, after: BiShared<T, E>) -> Arc<dyn Executor>;
}

struct Projection<U, T> {
    project: Arc<dyn Fn(&U) -> T + Send + Sync>,
}

impl<U, T, E> Source<T, E> for Projection<U, T>
where
    U: EventType + Extends<E>,
    T: 'static,
    E: ?Sized + 'static,
{
    fn handle(&self, predicate: BiPredicate<T, E>, consumer: BiShared<T, E>) -> Arc<dyn Executor> {
        let project = self.project.clone();
        Arc::new(TypedExecutor::new(move |event: &mut U| -> Result<(), BoxError> {
            let value = project(&*event);
            let view = <U as Extends<E>>::upcast_mut(event);
            if predicate.test(&value, view) {
                consumer(&value, view)
            } else {
                Ok(())
            }
        }))
    }

    fn cancel(&self, predicate: BiPredicate<T, E>, after: BiShared<T, E>) -> Arc<dyn Executor> {
        let project = self.project.clone();
        Arc::new(TypedExecutor::new(move |event: &mut U| -> Result<(), BoxError> {
            let value = project(&*event);
            if !predicate.test(&value, <U as Extends<E>>::upcast(event)) {
                return Ok(());
            }
            mark_cancelled(event, U::NAME)?;
            after(&value, <U as Extends<E>>::upcast_mut(event))
        }))
    }
}

struct Wrapper<T, E: ?Sized> {
    kind: EventKind,
    priority: Option<Priority>,
    source: Arc<dyn Source<T, E>>,
}

impl<T, E: ?Sized> Clone for Wrapper<T, E> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            priority: self.priority,
            source: self.source.clone(),
        }
    }
}

/// Builds one pipeline over values of type `T` projected from several kinds.
///
/// `E` is how the consumer sees the event next to the value. It defaults to
/// `dyn Event`; [`Registrar::handle_bundle_of`] picks a narrower supertype.
///
/// Each source may carry its own priority. Sources without one use the
/// bundle's priority.
///
/// # Example
///
/// ```rust,ignore
/// registrar
///     .handle_bundle::<Player>()
///     .from::<Join>(|join| join.player.clone())
///     .from_with_priority::<Quit>(Priority::Low, |quit| quit.player.clone())
///     .filter_value(|player| !player.is_op)
///     .handle_value(|player| seen.record(player.name.clone()))?;
/// ```
pub struct BundleHandler<'r, T, E: ?Sized = dyn Event> {
    registrar: &'r Registrar,
    state: HandlerState,
    predicate: BiPredicate<T, E>,
    wrappers: Vec<Wrapper<T, E>>,
}

impl<'r, T: 'static, E: ?Sized + 'static> BundleHandler<'r, T, E> {
    pub(crate) fn new(registrar: &'r Registrar) -> Self {
        Self {
            registrar,
            state: HandlerState::default(),
            predicate: BiPredicate::accept_all(),
            wrappers: Vec::new(),
        }
    }

    /// Adds kind `U` with the projection `project`.
    ///
    /// Adding a kind again replaces its projection and priority. The kind
    /// keeps the position it was first added at.
    pub fn from<U>(self, project: impl Fn(&U) -> T + Send + Sync + 'static) -> Self
    where
        U: EventType + Extends<E>,
    {
        self.push(None, project)
    }

    /// Adds kind `U` with its own priority.
    pub fn from_with_priority<U>(
        self,
        priority: Priority,
        project: impl Fn(&U) -> T + Send + Sync + 'static,
    ) -> Self
    where
        U: EventType + Extends<E>,
    {
        self.push(Some(priority), project)
    }

    fn push<U, F>(mut self, priority: Option<Priority>, project: F) -> Self
    where
        U: EventType + Extends<E>,
        F: Fn(&U) -> T + Send + Sync + 'static,
    {
        let wrapper = Wrapper {
            kind: U::kind(),
            priority,
            source: Arc::new(Projection { project: Arc::new(project) }),
        };

        match self.wrappers.iter_mut().find(|w| w.kind == wrapper.kind) {
            Some(existing) => *existing = wrapper,
            None => self.wrappers.push(wrapper),
        }
        self
    }

    /// The added kinds, in the order they were first added.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.wrappers.iter().map(|w| w.kind).collect()
    }

    /// Adds a predicate over the projected value and the event view.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T, &E) -> bool + Send + Sync + 'static,
    {
        self.predicate = self.predicate.and(predicate);
        self
    }

    /// Adds `predicate` when it is `Some`.
    pub fn maybe_filter<F>(self, predicate: Option<F>) -> Self
    where
        F: Fn(&T, &E) -> bool + Send + Sync + 'static,
    {
        match predicate {
            Some(predicate) => self.filter(predicate),
            None => self,
        }
    }

    /// Adds a predicate over the projected value only.
    pub fn filter_value<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter(move |value: &T, _: &E| predicate(value))
    }

    /// Adds a value-only `predicate` when it is `Some`.
    pub fn maybe_filter_value<F>(self, predicate: Option<F>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        match predicate {
            Some(predicate) => self.filter_value(predicate),
            None => self,
        }
    }

    /// Installs `consumer` once per added kind.
    pub fn handle<F, O>(self, consumer: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&T, &mut E) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        let consumer: BiShared<T, E> =
            Arc::new(move |value: &T, event: &mut E| consumer(value, event).into_outcome());

        if self.wrappers.is_empty() {
            debug!(subscriber = %self.registrar.subscriber(), "bundle has no kinds");
        }

        let ignore_cancelled = self.state.ignores_cancelled();
        for wrapper in &self.wrappers {
            let executor = wrapper
                .source
                .handle(self.predicate.clone(), consumer.clone());
            self.registrar.install(
                &wrapper.kind,
                self.priority_of(wrapper),
                ignore_cancelled,
                executor,
            )?;
        }
        Ok(self.registrar)
    }

    /// Installs a consumer that only sees the projected value.
    pub fn handle_value<F, O>(self, consumer: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&T) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        self.handle(move |value: &T, _: &mut E| consumer(value))
    }

    /// Cancels matching events of every cancellable kind.
    ///
    /// Kinds that are not cancellable are skipped and reported through
    /// [`RegistrationError::Partial`]; the others stay installed.
    pub fn cancel(self) -> Result<&'r Registrar, RegistrationError> {
        self.cancel_then(|_: &T, _: &mut E| {})
    }

    /// Like [`cancel`](Self::cancel), then runs `after` on each cancelled
    /// event.
    pub fn cancel_then<F, O>(self, after: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&T, &mut E) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        let after: BiShared<T, E> =
            Arc::new(move |value: &T, event: &mut E| after(value, event).into_outcome());

        let mut installed = 0;
        let mut rejected = Vec::new();
        for wrapper in &self.wrappers {
            if !wrapper.kind.is_cancellable() {
                rejected.push(InvalidConfiguration::NotCancellable {
                    kind: wrapper.kind.name(),
                });
                continue;
            }

            let executor = wrapper.source.cancel(self.predicate.clone(), after.clone());
            self.registrar
                .install(&wrapper.kind, self.priority_of(wrapper), true, executor)?;
            installed += 1;
        }

        if rejected.is_empty() {
            Ok(self.registrar)
        } else {
            warn!(
                subscriber = %self.registrar.subscriber(),
                installed,
                rejected = rejected.len(),
                "bundle cancellation skipped kinds without a cancelled flag"
            );
            Err(RegistrationError::Partial {
                installed,
                rejected,
            })
        }
    }

    /// Like [`cancel_then`](Self::cancel_then) with a value-only callback.
    pub fn cancel_then_value<F, O>(self, after: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&T) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        self.cancel_then(move |value: &T, _: &mut E| after(value))
    }

    fn priority_of(&self, wrapper: &Wrapper<T, E>) -> Priority {
        wrapper
            .priority
            .or(self.state.priority())
            .unwrap_or_default()
    }
}

impl<T, E: ?Sized> HandlerBuilder for BundleHandler<'_, T, E> {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }
}

impl<T, E: ?Sized> Clone for BundleHandler<'_, T, E> {
    fn clone(&self) -> Self {
        Self {
            registrar: self.registrar,
            state: self.state,
            predicate: self.predicate.clone(),
            wrappers: self.wrappers.clone(),
        }
    }
}

impl<T, E: ?Sized> fmt::Debug for BundleHandler<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleHandler")
            .field(
                "kinds",
                &self.wrappers.iter().map(|w| w.kind.name()).collect::<Vec<_>>(),
            )
            .field("state", &self.state)
            .field("predicate", &self.predicate)
            .finish()
    }
}
