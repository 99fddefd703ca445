//! Predicate chains used by the builders.
//!
//! A chain starts out accepting everything and only ever narrows: each
//! [`Predicate::and`] short-circuits on the first rejection, so later
//! predicates do not run for events an earlier one refused.

use std::{fmt, sync::Arc};

type Test<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type BiTest<T, E> = Arc<dyn Fn(&T, &E) -> bool + Send + Sync>;

/// An AND-chain of predicates over `T`.
pub struct Predicate<T: ?Sized> {
    test: Option<Test<T>>,
}

impl<T: ?Sized + 'static> Predicate<T> {
    /// A chain that accepts every value.
    pub fn accept_all() -> Self {
        Self { test: None }
    }

    /// A chain of one predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Some(Arc::new(predicate)),
        }
    }

    /// Appends `predicate` to the chain.
    pub fn and<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        match self.test {
            None => Self::new(predicate),
            Some(first) => Self::new(move |value: &T| first(value) && predicate(value)),
        }
    }

    /// Evaluates the chain.
    pub fn test(&self, value: &T) -> bool {
        self.test.as_ref().is_none_or(|test| test(value))
    }

    /// Whether no predicate was ever added.
    pub fn is_accept_all(&self) -> bool {
        self.test.is_none()
    }
}

impl<T: ?Sized + 'static> Default for Predicate<T> {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl<T: ?Sized> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            test: self.test.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("accept_all", &self.test.is_none())
            .finish()
    }
}

/// An AND-chain of predicates over a projected value and the event it
/// came from.
pub struct BiPredicate<T, E: ?Sized> {
    test: Option<BiTest<T, E>>,
}

impl<T: 'static, E: ?Sized + 'static> BiPredicate<T, E> {
    /// A chain that accepts every pair.
    pub fn accept_all() -> Self {
        Self { test: None }
    }

    /// A chain of one predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, &E) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Some(Arc::new(predicate)),
        }
    }

    /// Appends `predicate` to the chain.
    pub fn and<F>(self, predicate: F) -> Self
    where
        F: Fn(&T, &E) -> bool + Send + Sync + 'static,
    {
        match self.test {
            None => Self::new(predicate),
            Some(first) => {
                Self::new(move |value: &T, event: &E| first(value, event) && predicate(value, event))
            }
        }
    }

    /// Evaluates the chain.
    pub fn test(&self, value: &T, event: &E) -> bool {
        self.test.as_ref().is_none_or(|test| test(value, event))
    }

    /// Whether no predicate was ever added.
    pub fn is_accept_all(&self) -> bool {
        self.test.is_none()
    }
}

impl<T: 'static, E: ?Sized + 'static> Default for BiPredicate<T, E> {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl<T, E: ?Sized> Clone for BiPredicate<T, E> {
    fn clone(&self) -> Self {
        Self {
            test: self.test.clone(),
        }
    }
}

impl<T, E: ?Sized> fmt::Debug for BiPredicate<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiPredicate")
            .field("accept_all", &self.test.is_none())
            .finish()
    }
}
