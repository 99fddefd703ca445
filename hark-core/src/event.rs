//! # Event Model
//!
//! Events are opaque records produced by the host. Hark only needs three
//! things from them:
//!
//! - a runtime type tag, so an executor can refuse events of the wrong kind
//!   before it downcasts ([`Event`] is `Any`),
//! - the optional [`Cancellable`] capability,
//! - membership in supertypes, expressed with [`Extends`].
//!
//! Supertypes are traits. A broad "player event" supertype is a trait such as
//! `trait PlayerEvent: Event { fn player(&self) -> &Player; }` and a concrete
//! kind joins it by implementing `Extends<dyn PlayerEvent>`. Every event
//! extends `dyn Event`.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Join { player: Player, cancelled: bool }
//!
//! impl Event for Join {
//!     fn event_name(&self) -> &'static str { Self::NAME }
//!     fn as_cancellable(&self) -> Option<&dyn Cancellable> { Some(self) }
//!     fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> { Some(self) }
//! }
//!
//! impl EventType for Join {
//!     const NAME: &'static str = "Join";
//!     const CANCELLABLE: bool = true;
//! }
//! ```

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// An event record delivered by the host.
///
/// This trait is object-safe; the host hands events to executors as
/// `&mut dyn Event`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Hark `Event`",
    label = "missing `Event` implementation",
    note = "Events must be `Send + Sync + 'static`; `#[derive(hark::Event)]` implements this trait."
)]
pub trait Event: Any + Send + Sync + 'static {
    /// Human-readable name of the concrete kind.
    fn event_name(&self) -> &'static str;

    /// Returns the cancellation capability, if this kind has one.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }

    /// Mutable access to the cancellation capability.
    fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
        None
    }

    /// Whether the event has been marked cancelled. Always `false` for kinds
    /// without the capability.
    fn cancelled(&self) -> bool {
        self.as_cancellable().is_some_and(|c| c.is_cancelled())
    }
}

/// Static description of a concrete event kind.
///
/// `CANCELLABLE` is what registration-time validation looks at; it must agree
/// with [`Event::as_cancellable_mut`].
pub trait EventType: Event + Sized {
    /// Name reported in errors and logs.
    const NAME: &'static str;

    /// Whether the kind supports being marked cancelled.
    const CANCELLABLE: bool = false;

    /// The runtime tag of this kind.
    fn kind() -> EventKind {
        EventKind::of::<Self>()
    }
}

/// The cancellation capability.
pub trait Cancellable {
    /// Whether an earlier registration marked the event cancelled.
    fn is_cancelled(&self) -> bool;

    /// Marks or unmarks the event.
    fn set_cancelled(&mut self, cancelled: bool);
}

/// Membership of a concrete kind in a supertype `S`.
///
/// `S` is usually a trait object: `impl Extends<dyn PlayerEvent> for Join`.
pub trait Extends<S: ?Sized> {
    /// Views the event as its supertype.
    fn upcast(&self) -> &S;

    /// Mutable view of the event as its supertype.
    fn upcast_mut(&mut self) -> &mut S;
}

impl<U: Event> Extends<dyn Event> for U {
    fn upcast(&self) -> &(dyn Event + 'static) {
        self
    }

    fn upcast_mut(&mut self) -> &mut (dyn Event + 'static) {
        self
    }
}

/// A type tag identifying one concrete event kind.
///
/// Equality and hashing only consider the [`TypeId`].
#[derive(Clone, Copy)]
pub struct EventKind {
    type_id: TypeId,
    name: &'static str,
    cancellable: bool,
}

impl EventKind {
    /// The tag for `U`.
    pub fn of<U: EventType>() -> Self {
        Self {
            type_id: TypeId::of::<U>(),
            name: U::NAME,
            cancellable: U::CANCELLABLE,
        }
    }

    /// The tag's [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.type_id
    }

    /// The kind's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the kind supports cancellation.
    pub fn is_cancellable(&self) -> bool {
        self.cancellable
    }

    /// Whether `event` is an instance of this kind.
    pub fn matches(&self, event: &dyn Event) -> bool {
        let any: &dyn Any = event;
        any.type_id() == self.type_id
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventKind")
            .field("name", &self.name)
            .field("cancellable", &self.cancellable)
            .finish()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Event for Plain {
        fn event_name(&self) -> &'static str {
            Self::NAME
        }
    }

    impl EventType for Plain {
        const NAME: &'static str = "Plain";
    }

    struct Stoppable {
        cancelled: bool,
    }

    impl Event for Stoppable {
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

    impl EventType for Stoppable {
        const NAME: &'static str = "Stoppable";
        const CANCELLABLE: bool = true;
    }

    impl Cancellable for Stoppable {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    #[test]
    fn test_kind_identity() {
        assert_eq!(Plain::kind(), EventKind::of::<Plain>());
        assert_ne!(Plain::kind(), Stoppable::kind());
        assert_eq!(Stoppable::kind().name(), "Stoppable");
        assert!(Stoppable::kind().is_cancellable());
        assert!(!Plain::kind().is_cancellable());
    }

    #[test]
    fn test_kind_matches_runtime_type() {
        let plain: Box<dyn Event> = Box::new(Plain);
        assert!(Plain::kind().matches(plain.as_ref()));
        assert!(!Stoppable::kind().matches(plain.as_ref()));
    }

    #[test]
    fn test_cancelled_flag_defaults() {
        assert!(!Plain.cancelled());

        let mut event = Stoppable { cancelled: false };
        event.as_cancellable_mut().unwrap().set_cancelled(true);
        assert!(event.cancelled());
    }

    #[test]
    fn test_every_event_extends_dyn_event() {
        let mut event = Stoppable { cancelled: false };
        let erased: &mut dyn Event = Extends::<dyn Event>::upcast_mut(&mut event);
        assert_eq!(erased.event_name(), "Stoppable");
    }
}
