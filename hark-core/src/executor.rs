//! # Executors
//!
//! An executor is what the host stores in its dispatch table: an object-safe
//! callback over `&mut dyn Event`. Hosts key their tables by kind, but a table
//! may be shared by several kinds, so every executor built by Hark checks the
//! runtime type of the event before it downcasts.
//!
//! [`TypedExecutor`] is that adapter. It also owns the failure boundary: an
//! error returned by user code or a panic raised inside it comes back as a
//! [`DispatchFailure`] instead of unwinding through the host's dispatch loop,
//! which would abort delivery to every sibling registration.

use crate::{
    error::{BoxError, DispatchFailure},
    event::{Event, EventKind, EventType},
    outcome::IntoOutcome,
};
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

/// A callback stored in a host dispatch table.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Executor`",
    label = "missing `Executor` implementation",
    note = "Executors must implement `execute(&self, &mut dyn Event)`."
)]
pub trait Executor: Send + Sync + 'static {
    /// Handles one event.
    fn execute(&self, event: &mut dyn Event) -> Result<(), DispatchFailure>;
}

impl<F> Executor for F
where
    F: Fn(&mut dyn Event) -> Result<(), DispatchFailure> + Send + Sync + 'static,
{
    fn execute(&self, event: &mut dyn Event) -> Result<(), DispatchFailure> {
        (self)(event)
    }
}

type Consumer<U> = Box<dyn Fn(&mut U) -> Result<(), BoxError> + Send + Sync>;

/// Adapts a typed consumer to an [`Executor`].
///
/// Events whose runtime kind is not `U` are skipped without calling the
/// consumer.
pub struct TypedExecutor<U> {
    kind: EventKind,
    consumer: Consumer<U>,
}

impl<U: EventType> TypedExecutor<U> {
    /// Wraps `consumer`.
    pub fn new<F, O>(consumer: F) -> Self
    where
        F: Fn(&mut U) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        Self {
            kind: U::kind(),
            consumer: Box::new(move |event| consumer(event).into_outcome()),
        }
    }

    /// The kind this executor accepts.
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl<U: EventType> Executor for TypedExecutor<U> {
    fn execute(&self, event: &mut dyn Event) -> Result<(), DispatchFailure> {
        let any: &mut dyn Any = event;
        let Some(typed) = any.downcast_mut::<U>() else {
            return Ok(());
        };

        match panic::catch_unwind(AssertUnwindSafe(|| (self.consumer)(typed))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DispatchFailure::Consumer {
                kind: self.kind.name(),
                source,
            }),
            Err(payload) => Err(DispatchFailure::Panicked {
                kind: self.kind.name(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl<U> fmt::Debug for TypedExecutor<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedExecutor")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Cancellable;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    struct Chat {
        text: String,
    }

    impl Event for Chat {
        fn event_name(&self) -> &'static str {
            Self::NAME
        }
    }

    impl EventType for Chat {
        const NAME: &'static str = "Chat";
    }

    struct Move {
        cancelled: bool,
    }

    impl Event for Move {
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

    impl EventType for Move {
        const NAME: &'static str = "Move";
        const CANCELLABLE: bool = true;
    }

    impl Cancellable for Move {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    #[test]
    fn test_matching_kind_invokes_consumer() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let executor = TypedExecutor::new(move |chat: &mut Chat| {
            assert_eq!(chat.text, "hi");
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Chat { text: "hi".into() };
        executor.execute(&mut event).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_other_kind_is_skipped() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let executor = TypedExecutor::new(move |_: &mut Chat| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Move { cancelled: false };
        assert!(executor.execute(&mut event).is_ok());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_consumer_can_mutate() {
        let executor = TypedExecutor::new(|event: &mut Move| event.set_cancelled(true));
        let mut event = Move { cancelled: false };
        executor.execute(&mut event).unwrap();
        assert!(event.cancelled);
    }

    #[test]
    fn test_error_is_wrapped() {
        let executor =
            TypedExecutor::new(|_: &mut Chat| -> Result<(), BoxError> { Err("no permission".into()) });
        let mut event = Chat { text: String::new() };

        match executor.execute(&mut event) {
            Err(DispatchFailure::Consumer { kind, source }) => {
                assert_eq!(kind, "Chat");
                assert_eq!(source.to_string(), "no permission");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_panic_is_caught() {
        let executor = TypedExecutor::new(|_: &mut Chat| -> Result<(), BoxError> {
            panic!("consumer exploded")
        });
        let mut event = Chat { text: String::new() };

        match executor.execute(&mut event) {
            Err(DispatchFailure::Panicked { kind, message }) => {
                assert_eq!(kind, "Chat");
                assert_eq!(message, "consumer exploded");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_closure_executor() {
        let executor = |event: &mut dyn Event| -> Result<(), DispatchFailure> {
            assert_eq!(event.event_name(), "Chat");
            Ok(())
        };
        let mut event = Chat { text: String::new() };
        executor.execute(&mut event).unwrap();
    }
}
