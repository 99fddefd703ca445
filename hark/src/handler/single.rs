//! Pipelines over one concrete event kind.

use super::{HandlerBuilder, HandlerState, ensure_cancellable, mark_cancelled};
use crate::{predicate::Predicate, registrar::Registrar};
use hark_core::{BoxError, EventType, IntoOutcome, RegistrationError, TypedExecutor};
use std::{fmt, sync::Arc};

/// Builds a pipeline for events of kind `U`.
///
/// Created by [`Registrar::handle_event`].
///
/// # Example
///
/// ```rust,ignore
/// registrar
///     .handle_event::<Join>()
///     .priority(Priority::High)
///     .filter(|join| !join.player.is_op)
///     .handle(|join| join.message = None)?;
/// ```
pub struct SingleKindHandler<'r, U> {
    registrar: &'r Registrar,
    state: HandlerState,
    predicate: Predicate<U>,
}

impl<'r, U: EventType> SingleKindHandler<'r, U> {
    pub(crate) fn new(registrar: &'r Registrar) -> Self {
        Self {
            registrar,
            state: HandlerState::default(),
            predicate: Predicate::accept_all(),
        }
    }

    /// Adds a predicate. Events must pass every predicate, in the order added.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&U) -> bool + Send + Sync + 'static,
    {
        self.predicate = self.predicate.and(predicate);
        self
    }

    /// Adds `predicate` when it is `Some`.
    pub fn maybe_filter<F>(self, predicate: Option<F>) -> Self
    where
        F: Fn(&U) -> bool + Send + Sync + 'static,
    {
        match predicate {
            Some(predicate) => self.filter(predicate),
            None => self,
        }
    }

    /// Installs `consumer` for events that pass the predicate chain.
    pub fn handle<F, O>(self, consumer: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&mut U) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        let predicate = self.predicate;
        let executor = TypedExecutor::new(move |event: &mut U| -> Result<(), BoxError> {
            if predicate.test(event) {
                consumer(event).into_outcome()
            } else {
                Ok(())
            }
        });

        self.registrar.install(
            &U::kind(),
            self.state.effective_priority(),
            self.state.ignores_cancelled(),
            Arc::new(executor),
        )?;
        Ok(self.registrar)
    }

    /// Cancels events that pass the predicate chain.
    ///
    /// Fails with [`InvalidConfiguration`](hark_core::InvalidConfiguration)
    /// when `U` is not cancellable.
    pub fn cancel(self) -> Result<&'r Registrar, RegistrationError> {
        self.cancel_then(|_: &mut U| {})
    }

    /// Cancels events that pass the predicate chain, then runs `after` on
    /// them.
    ///
    /// Cancellation pipelines always skip events that are already cancelled,
    /// whatever [`HandlerBuilder::set_ignore_cancelled`] says.
    pub fn cancel_then<F, O>(self, after: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&mut U) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        let kind = U::kind();
        ensure_cancellable(&kind)?;

        let predicate = self.predicate;
        let executor = TypedExecutor::new(move |event: &mut U| -> Result<(), BoxError> {
            if !predicate.test(event) {
                return Ok(());
            }
            mark_cancelled(event, U::NAME)?;
            after(event).into_outcome()
        });

        self.registrar.install(
            &kind,
            self.state.effective_priority(),
            true,
            Arc::new(executor),
        )?;
        Ok(self.registrar)
    }
}

impl<U> HandlerBuilder for SingleKindHandler<'_, U> {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }
}

impl<U> Clone for SingleKindHandler<'_, U> {
    fn clone(&self) -> Self {
        Self {
            registrar: self.registrar,
            state: self.state,
            predicate: self.predicate.clone(),
        }
    }
}

impl<U: EventType> fmt::Debug for SingleKindHandler<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleKindHandler")
            .field("kind", &U::NAME)
            .field("state", &self.state)
            .field("predicate", &self.predicate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::{Cancellable, Event, InvalidConfiguration, Priority};
    use hark_std::{
        EventBus,
        testing::{CallCounter, Recorder},
    };

    #[derive(Default)]
    struct Knock {
        loud: bool,
        cancelled: bool,
    }

    impl Event for Knock {
        fn event_name(&self) -> &'static str {
            Self::NAME
        }

        fn as_cancellable(&self) -> Option<&dyn Cancellable> {
            Some(self)
        }

        fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
            Some(self)
        }
    }

    impl EventType for Knock {
        const NAME: &'static str = "Knock";
        const CANCELLABLE: bool = true;
    }

    impl Cancellable for Knock {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    struct Echo;

    impl Event for Echo {
        fn event_name(&self) -> &'static str {
            Self::NAME
        }
    }

    impl EventType for Echo {
        const NAME: &'static str = "Echo";
    }

    fn setup() -> (Arc<EventBus>, Registrar) {
        let bus = Arc::new(EventBus::new());
        let registrar = Registrar::new("single", bus.clone());
        (bus, registrar)
    }

    #[test]
    fn test_defaults() {
        let (_bus, registrar) = setup();
        let builder = registrar.handle_event::<Knock>();
        assert_eq!(builder.state().priority(), None);
        assert_eq!(builder.state().effective_priority(), Priority::Normal);
        assert!(!builder.state().ignores_cancelled());
    }

    #[test]
    fn test_handle_with_filter() {
        let (bus, registrar) = setup();
        let counter = CallCounter::new();

        registrar
            .handle_event::<Knock>()
            .filter(|knock| knock.loud)
            .handle(counter.consumer::<Knock>())
            .unwrap();

        bus.call(&mut Knock::default());
        assert_eq!(counter.count(), 0);

        bus.call(&mut Knock {
            loud: true,
            ..Default::default()
        });
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_cancel_sets_flag() {
        let (bus, registrar) = setup();
        registrar
            .handle_event::<Knock>()
            .filter(|knock| knock.loud)
            .cancel()
            .unwrap();

        let mut quiet = Knock::default();
        bus.call(&mut quiet);
        assert!(!quiet.cancelled);

        let mut loud = Knock {
            loud: true,
            ..Default::default()
        };
        bus.call(&mut loud);
        assert!(loud.cancelled);
    }

    #[test]
    fn test_cancel_then_runs_after_flag() {
        let (bus, registrar) = setup();
        let seen = Recorder::new();
        let recorder = seen.clone();

        registrar
            .handle_event::<Knock>()
            .cancel_then(move |knock: &mut Knock| recorder.record(knock.cancelled))
            .unwrap();

        bus.call(&mut Knock::default());
        assert_eq!(seen.values(), vec![true]);
    }

    #[test]
    fn test_cancel_skips_cancelled_events() {
        let (bus, registrar) = setup();
        let counter = CallCounter::new();

        registrar
            .handle_event::<Knock>()
            .accept_cancelled()
            .filter(counter.predicate::<Knock>(true))
            .cancel()
            .unwrap();

        bus.call(&mut Knock {
            cancelled: true,
            ..Default::default()
        });
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_cancel_rejects_non_cancellable() {
        let (bus, registrar) = setup();
        let err = registrar.handle_event::<Echo>().cancel().unwrap_err();

        assert!(matches!(
            err,
            RegistrationError::InvalidConfiguration(InvalidConfiguration::NotCancellable {
                kind: "Echo"
            })
        ));
        assert_eq!(bus.registration_count(&Echo::kind()), 0);
    }

    #[test]
    fn test_clone_registers_twice() {
        let (bus, registrar) = setup();
        let counter = CallCounter::new();
        let builder = registrar.handle_event::<Echo>().priority(Priority::Low);

        builder.clone().handle(counter.consumer::<Echo>()).unwrap();
        builder.handle(counter.consumer::<Echo>()).unwrap();

        bus.call(&mut Echo);
        assert_eq!(counter.count(), 2);
    }
}
