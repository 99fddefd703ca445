//! Consumer helpers for `handle(...)`.

use hark_core::Cancellable;

/// Sets the cancelled flag to `cancelled`.
///
/// Unlike a cancellation pipeline this also clears the flag when given
/// `false`, which is how a later registration can un-cancel an event.
pub fn set_cancelled<T>(cancelled: bool) -> impl Fn(&mut T) + Clone + Send + Sync + 'static
where
    T: Cancellable + ?Sized,
{
    move |event: &mut T| event.set_cancelled(cancelled)
}

/// Does nothing.
pub fn noop<T: ?Sized>() -> impl Fn(&mut T) + Clone + Send + Sync + 'static {
    |_: &mut T| {}
}
