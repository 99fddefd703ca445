//! Testing utilities for Hark.
//!
//! This module provides utilities to make testing pipelines easier.
//!
//! # Features
//!
//! - [`CallCounter`]: Counts consumer invocations and predicate evaluations
//! - [`Recorder`]: Records values seen by consumers
//! - [`BrokenResolver`]: A host whose dispatch tables cannot be reached

use hark_core::{DispatchTableResolver, EventKind, HandlerList, HostAccessError, SubscriberId};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Call Counter
// ============================================================================

/// Counts how often the closures it hands out are called.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CallCounter::new();
///
/// registrar
///     .handle_event::<Join>()
///     .handle(counter.consumer())?;
///
/// bus.call(&mut join);
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Create a new counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    /// Increment the counter by one.
    pub fn tick(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// A consumer that only counts.
    pub fn consumer<T: ?Sized>(&self) -> impl Fn(&mut T) + Clone + Send + Sync + 'static {
        let counter = self.clone();
        move |_: &mut T| counter.tick()
    }

    /// A predicate that counts its evaluations and always answers `result`.
    pub fn predicate<T: ?Sized>(
        &self,
        result: bool,
    ) -> impl Fn(&T) -> bool + Clone + Send + Sync + 'static {
        let counter = self.clone();
        move |_: &T| {
            counter.tick();
            result
        }
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// Records values in the order they were seen.
///
/// Clones share the same storage.
pub struct Recorder<V> {
    values: Arc<Mutex<Vec<V>>>,
}

impl<V: Clone> Recorder<V> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record one value.
    pub fn record(&self, value: V) {
        self.values.lock().push(value);
    }

    /// Get a clone of the recorded values.
    pub fn values(&self) -> Vec<V> {
        self.values.lock().clone()
    }

    /// Get the number of recorded values.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    /// Clear all recorded values.
    pub fn clear(&self) {
        self.values.lock().clear();
    }
}

impl<V: Clone> Default for Recorder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Recorder<V> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
        }
    }
}

// ============================================================================
// Broken Resolver
// ============================================================================

/// A host whose dispatch tables can never be resolved.
///
/// Useful for exercising the [`HostAccessError`] path.
#[derive(Debug, Clone)]
pub struct BrokenResolver {
    reason: String,
}

impl BrokenResolver {
    /// Create a resolver that fails with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl DispatchTableResolver for BrokenResolver {
    fn resolve(&self, _kind: &EventKind) -> Result<Arc<dyn HandlerList>, HostAccessError> {
        Err(HostAccessError::Unavailable(self.reason.clone()))
    }

    fn unregister_all(&self, _subscriber: &SubscriberId) -> usize {
        0
    }
}
