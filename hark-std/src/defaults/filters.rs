//! Predicate helpers for `filter(...)`.

use hark_core::Event;

/// Passes events already marked cancelled.
///
/// # Example
///
/// ```rust,ignore
/// registrar
///     .handle_event::<Chat>()
///     .accept_cancelled()
///     .filter(filters::is_cancelled())
///     .handle(|chat| audit(chat))?;
/// ```
pub fn is_cancelled<T>() -> impl Fn(&T) -> bool + Clone + Send + Sync + 'static
where
    T: Event + ?Sized,
{
    |event: &T| event.cancelled()
}

/// Passes events not marked cancelled.
pub fn not_cancelled<T>() -> impl Fn(&T) -> bool + Clone + Send + Sync + 'static
where
    T: Event + ?Sized,
{
    |event: &T| !event.cancelled()
}

/// Passes everything.
pub fn always<T: ?Sized>() -> impl Fn(&T) -> bool + Clone + Send + Sync + 'static {
    |_: &T| true
}

/// Passes nothing.
pub fn never<T: ?Sized>() -> impl Fn(&T) -> bool + Clone + Send + Sync + 'static {
    |_: &T| false
}

/// Inverts a predicate.
pub fn not<T, P>(predicate: P) -> impl Fn(&T) -> bool + Send + Sync + 'static
where
    T: ?Sized,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    move |value: &T| !predicate(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::Cancellable;

    struct Door {
        cancelled: bool,
    }

    impl Event for Door {
        fn event_name(&self) -> &'static str {
            "Door"
        }

        fn as_cancellable(&self) -> Option<&dyn Cancellable> {
            Some(self)
        }
    }

    impl Cancellable for Door {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    #[test]
    fn test_cancelled_filters() {
        let open = Door { cancelled: false };
        let shut = Door { cancelled: true };

        assert!(is_cancelled()(&shut));
        assert!(!is_cancelled()(&open));
        assert!(not_cancelled()(&open));
        assert!(!not_cancelled()(&shut));
    }

    #[test]
    fn test_on_trait_objects() {
        let shut: Box<dyn Event> = Box::new(Door { cancelled: true });
        assert!(is_cancelled::<dyn Event>()(shut.as_ref()));
    }

    #[test]
    fn test_constants_and_not() {
        assert!(always::<str>()("x"));
        assert!(!never::<str>()("x"));
        let short = not(|s: &str| s.len() > 3);
        assert!(short("abc"));
        assert!(!short("abcd"));
    }
}
