//! Subscriber identity.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// The identity every registration is tagged with.
///
/// Two identities are equal only if one was cloned from the other; the
/// label is for logs.
#[derive(Clone)]
pub struct SubscriberId {
    id: u64,
    label: Arc<str>,
}

impl SubscriberId {
    /// Allocates a fresh identity.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
        }
    }

    /// The numeric part of the identity.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The label given at creation.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for SubscriberId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubscriberId {}

impl std::hash::Hash for SubscriberId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({}#{})", self.label, self.id)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.id)
    }
}
