//! Error types for Hark.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HarkError`] - Top-level error type for all Hark operations
//! - [`InvalidConfiguration`] - A pipeline that cannot be registered as built
//! - [`HostAccessError`] - The host's dispatch table could not be reached
//! - [`DispatchFailure`] - A registration failed while handling one event
//! - [`RegistrationError`] - What a terminal builder operation returns

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Hark operations.
#[derive(Error, Debug)]
pub enum HarkError {
    /// A pipeline was configured in a way that cannot be registered.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] InvalidConfiguration),

    /// The host's dispatch table could not be reached.
    #[error("host access error: {0}")]
    HostAccess(#[from] HostAccessError),

    /// A registration failed while handling an event.
    #[error("dispatch failure: {0}")]
    Dispatch(#[from] DispatchFailure),

    /// A terminal operation failed.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// A pipeline that cannot be registered as built.
///
/// Raised synchronously by terminal operations, before anything is installed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidConfiguration {
    /// A cancellation pipeline targets a kind without the cancellable capability.
    #[error("event kind {kind} is not cancellable")]
    NotCancellable {
        /// Name of the offending kind.
        kind: &'static str,
    },
}

/// The host's dispatch table for a kind could not be resolved.
///
/// Fatal for the registration attempt; never retried.
#[derive(Error, Debug)]
pub enum HostAccessError {
    /// The host has no dispatch table for this kind.
    #[error("host has no dispatch table for event kind {kind}")]
    UnknownKind {
        /// Name of the kind that failed to resolve.
        kind: &'static str,
    },

    /// The host's internals could not be reached.
    #[error("host dispatch tables unavailable: {0}")]
    Unavailable(String),

    /// A host-specific failure.
    #[error(transparent)]
    Custom(BoxError),
}

/// A registration failed while handling one event.
///
/// Executors return this instead of letting a failure unwind into the host's
/// dispatch loop, so sibling registrations still see the event.
#[derive(Error, Debug)]
pub enum DispatchFailure {
    /// A predicate or consumer returned an error.
    #[error("handler for {kind} failed")]
    Consumer {
        /// Kind of the event being handled.
        kind: &'static str,
        /// The consumer's error.
        #[source]
        source: BoxError,
    },

    /// A predicate or consumer panicked.
    #[error("handler for {kind} panicked: {message}")]
    Panicked {
        /// Kind of the event being handled.
        kind: &'static str,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl DispatchFailure {
    /// Name of the kind whose handler failed.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchFailure::Consumer { kind, .. } | DispatchFailure::Panicked { kind, .. } => kind,
        }
    }
}

/// Errors returned by terminal builder operations.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Nothing was installed because the pipeline is invalid.
    #[error(transparent)]
    InvalidConfiguration(#[from] InvalidConfiguration),

    /// The host rejected the installation.
    #[error(transparent)]
    HostAccess(#[from] HostAccessError),

    /// Some wrappers of a bundle were installed and others were rejected.
    #[error("{installed} registration(s) installed, {} rejected", .rejected.len())]
    Partial {
        /// Number of registrations that were installed.
        installed: usize,
        /// Why each rejected wrapper was refused.
        rejected: Vec<InvalidConfiguration>,
    },
}

// Convenience conversions
impl From<BoxError> for HarkError {
    fn from(err: BoxError) -> Self {
        HarkError::Custom(err)
    }
}

impl From<BoxError> for HostAccessError {
    fn from(err: BoxError) -> Self {
        HostAccessError::Custom(err)
    }
}
