//! Registration priority.

use std::{fmt, str::FromStr};

/// Order in which the host invokes competing registrations for one kind.
///
/// Registrations run from [`Priority::Lowest`] to [`Priority::Monitor`], so a
/// higher priority has the last word on an event. `Monitor` is meant for
/// observers that must not change the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Runs first.
    Lowest,
    /// Runs before [`Priority::Normal`].
    Low,
    /// The default.
    #[default]
    Normal,
    /// Runs after [`Priority::Normal`].
    High,
    /// Runs after every modifying registration.
    Highest,
    /// Runs last; observe only.
    Monitor,
}

impl Priority {
    /// Every priority in invocation order.
    pub const ALL: [Priority; 6] = [
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Highest,
        Priority::Monitor,
    ];

    /// The lowercase name of this priority.
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Lowest => "lowest",
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Highest => "highest",
            Priority::Monitor => "monitor",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no priority.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}
