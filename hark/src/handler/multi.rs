//! One pipeline over several kinds that share a supertype.

use super::{HandlerBuilder, HandlerState, ensure_cancellable, mark_cancelled};
use crate::{predicate::Predicate, registrar::Registrar};
use hark_core::{
    BoxError, EventKind, EventType, Executor, Extends, IntoOutcome, RegistrationError,
    TypedExecutor,
};
use std::{fmt, sync::Arc};
use tracing::debug;

type Shared<S> = Arc<dyn Fn(&mut S) -> Result<(), BoxError> + Send + Sync>;
type Bind<S> = fn(Predicate<S>, Shared<S>) -> Arc<dyn Executor>;

/// A source kind, with the executor constructors monomorphized for it.
struct Member<S: ?Sized> {
    kind: EventKind,
    handle: Bind<S>,
    cancel: Bind<S>,
}

impl<S: ?Sized> Clone for Member<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            handle: self.handle,
            cancel: self.cancel,
        }
    }
}

/// Builds one pipeline and installs it for every added kind.
///
/// User code sees each event through the supertype `S`, usually a trait
/// object such as `dyn PlayerEvent`. Only kinds implementing
/// [`Extends<S>`] can be added. Created by [`Registrar::handle_events`].
///
/// # Example
///
/// ```rust,ignore
/// registrar
///     .handle_events::<dyn PlayerEvent>()
///     .from::<Break>()
///     .from::<BucketFill>()
///     .filter(|event| !event.player().is_op)
///     .cancel()?;
/// ```
pub struct MultiKindHandler<'r, S: ?Sized> {
    registrar: &'r Registrar,
    state: HandlerState,
    predicate: Predicate<S>,
    members: Vec<Member<S>>,
}

impl<'r, S: ?Sized + 'static> MultiKindHandler<'r, S> {
    pub(crate) fn new(registrar: &'r Registrar) -> Self {
        Self {
            registrar,
            state: HandlerState::default(),
            predicate: Predicate::accept_all(),
            members: Vec::new(),
        }
    }

    /// Adds kind `U`. Adding a kind twice has no effect.
    pub fn from<U>(mut self) -> Self
    where
        U: EventType + Extends<S>,
    {
        let kind = U::kind();
        if !self.members.iter().any(|member| member.kind == kind) {
            self.members.push(Member {
                kind,
                handle: handle_executor::<U, S>,
                cancel: cancel_executor::<U, S>,
            });
        }
        self
    }

    /// The added kinds, in the order they were first added.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.members.iter().map(|member| member.kind).collect()
    }

    /// Adds a predicate over the supertype view.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.predicate = self.predicate.and(predicate);
        self
    }

    /// Adds `predicate` when it is `Some`.
    pub fn maybe_filter<F>(self, predicate: Option<F>) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        match predicate {
            Some(predicate) => self.filter(predicate),
            None => self,
        }
    }

    /// Installs `consumer` once per added kind.
    ///
    /// A host failure stops at the failing kind. Kinds installed before it
    /// stay installed.
    pub fn handle<F, O>(self, consumer: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&mut S) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        let consumer: Shared<S> = Arc::new(move |event: &mut S| consumer(event).into_outcome());
        let ignore_cancelled = self.state.ignores_cancelled();
        self.install(|member| member.handle, consumer, ignore_cancelled)
    }

    /// Cancels matching events of every added kind.
    ///
    /// Every kind must be cancellable. Nothing is installed otherwise.
    pub fn cancel(self) -> Result<&'r Registrar, RegistrationError> {
        self.cancel_then(|_: &mut S| {})
    }

    /// Cancels matching events of every added kind, then runs `after` on
    /// them.
    pub fn cancel_then<F, O>(self, after: F) -> Result<&'r Registrar, RegistrationError>
    where
        F: Fn(&mut S) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        for member in &self.members {
            ensure_cancellable(&member.kind)?;
        }

        let after: Shared<S> = Arc::new(move |event: &mut S| after(event).into_outcome());
        self.install(|member| member.cancel, after, true)
    }

    fn install(
        self,
        bind: impl Fn(&Member<S>) -> Bind<S>,
        consumer: Shared<S>,
        ignore_cancelled: bool,
    ) -> Result<&'r Registrar, RegistrationError> {
        if self.members.is_empty() {
            debug!(subscriber = %self.registrar.subscriber(), "multi-kind pipeline has no kinds");
        }

        let priority = self.state.effective_priority();
        for member in &self.members {
            let executor = bind(member)(self.predicate.clone(), consumer.clone());
            self.registrar
                .install(&member.kind, priority, ignore_cancelled, executor)?;
        }
        Ok(self.registrar)
    }
}

fn handle_executor<U, S>(predicate: Predicate<S>, consumer: Shared<S>) -> Arc<dyn Executor>
where
    U: EventType + Extends<S>,
    S: ?Sized + 'static,
{
    Arc::new(TypedExecutor::new(move |event: &mut U| -> Result<(), BoxError> {
        let view = <U as Extends<S>>::upcast_mut(event);
        if predicate.test(view) {
            consumer(view)
        } else {
            Ok(())
        }
    }))
}

fn cancel_executor<U, S>(predicate: Predicate<S>, after: Shared<S>) -> Arc<dyn Executor>
where
    U: EventType + Extends<S>,
    S: ?Sized + 'static,
{
    Arc::new(TypedExecutor::new(move |event: &mut U| -> Result<(), BoxError> {
        if !predicate.test(<U as Extends<S>>::upcast(event)) {
            return Ok(());
        }
        mark_cancelled(event, U::NAME)?;
        after(<U as Extends<S>>::upcast_mut(event))
    }))
}

impl<S: ?Sized> HandlerBuilder for MultiKindHandler<'_, S> {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }
}

impl<S: ?Sized> Clone for MultiKindHandler<'_, S> {
    fn clone(&self) -> Self {
        Self {
            registrar: self.registrar,
            state: self.state,
            predicate: self.predicate.clone(),
            members: self.members.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for MultiKindHandler<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiKindHandler")
            .field(
                "kinds",
                &self.members.iter().map(|m| m.kind.name()).collect::<Vec<_>>(),
            )
            .field("state", &self.state)
            .field("predicate", &self.predicate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::{Cancellable, Event, InvalidConfiguration};
    use hark_std::{EventBus, testing::Recorder};

    trait Noise: Event {
        fn volume(&self) -> u8;
    }

    #[derive(Default)]
    struct Bark {
        volume: u8,
        cancelled: bool,
    }

    impl Event for Bark {
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

    impl EventType for Bark {
        const NAME: &'static str = "Bark";
        const CANCELLABLE: bool = true;
    }

    impl Cancellable for Bark {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    impl Noise for Bark {
        fn volume(&self) -> u8 {
            self.volume
        }
    }

    impl Extends<dyn Noise> for Bark {
        fn upcast(&self) -> &(dyn Noise + 'static) {
            self
        }

        fn upcast_mut(&mut self) -> &mut (dyn Noise + 'static) {
            self
        }
    }

    struct Hum(u8);

    impl Event for Hum {
        fn event_name(&self) -> &'static str {
            Self::NAME
        }
    }

    impl EventType for Hum {
        const NAME: &'static str = "Hum";
    }

    impl Noise for Hum {
        fn volume(&self) -> u8 {
            self.0
        }
    }

    impl Extends<dyn Noise> for Hum {
        fn upcast(&self) -> &(dyn Noise + 'static) {
            self
        }

        fn upcast_mut(&mut self) -> &mut (dyn Noise + 'static) {
            self
        }
    }

    fn setup() -> (Arc<EventBus>, Registrar) {
        let bus = Arc::new(EventBus::new());
        let registrar = Registrar::new("multi", bus.clone());
        (bus, registrar)
    }

    #[test]
    fn test_from_deduplicates() {
        let (_bus, registrar) = setup();
        let builder = registrar
            .handle_events::<dyn Noise>()
            .from::<Bark>()
            .from::<Hum>()
            .from::<Bark>();
        assert_eq!(builder.kinds(), vec![Bark::kind(), Hum::kind()]);
    }

    #[test]
    fn test_handle_every_kind() {
        let (bus, registrar) = setup();
        let volumes = Recorder::new();
        let recorder = volumes.clone();

        registrar
            .handle_events::<dyn Noise>()
            .from::<Bark>()
            .from::<Hum>()
            .filter(|noise| noise.volume() > 1)
            .handle(move |noise: &mut dyn Noise| recorder.record(noise.volume()))
            .unwrap();

        bus.call(&mut Bark {
            volume: 3,
            ..Default::default()
        });
        bus.call(&mut Hum(1));
        bus.call(&mut Hum(7));
        assert_eq!(volumes.values(), vec![3, 7]);
    }

    #[test]
    fn test_cancel_is_all_or_nothing() {
        let (bus, registrar) = setup();
        let err = registrar
            .handle_events::<dyn Noise>()
            .from::<Bark>()
            .from::<Hum>()
            .cancel()
            .unwrap_err();

        assert!(matches!(
            err,
            RegistrationError::InvalidConfiguration(InvalidConfiguration::NotCancellable {
                kind: "Hum"
            })
        ));
        assert_eq!(bus.total_registrations(), 0);
    }

    #[test]
    fn test_cancel_filters_on_supertype() {
        let (bus, registrar) = setup();
        registrar
            .handle_events::<dyn Noise>()
            .from::<Bark>()
            .filter(|noise| noise.volume() >= 5)
            .cancel()
            .unwrap();

        let mut soft = Bark {
            volume: 2,
            ..Default::default()
        };
        let mut loud = Bark {
            volume: 9,
            ..Default::default()
        };
        bus.call(&mut soft);
        bus.call(&mut loud);
        assert!(!soft.cancelled);
        assert!(loud.cancelled);
    }

    #[test]
    fn test_no_kinds_installs_nothing() {
        let (bus, registrar) = setup();
        registrar
            .handle_events::<dyn Noise>()
            .handle(|_: &mut dyn Noise| {})
            .unwrap();
        assert_eq!(bus.total_registrations(), 0);
    }
}
