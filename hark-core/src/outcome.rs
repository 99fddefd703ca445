//! Outcome conversion traits.

use crate::error::BoxError;

/// Trait for converting a consumer's return value into a handling outcome.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<T, E>` → delegates to `T` or reports `E`
/// - `Option<T>` → `None` is success
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `IntoOutcome`",
    label = "consumers must return `()` or `Result<(), E>`",
    note = "IntoOutcome must implement the `into_outcome` method."
)]
pub trait IntoOutcome {
    /// Convert the output into success or a reportable error.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.into()),
        }
    }
}

impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> Result<(), BoxError> {
        match self {
            Some(t) => t.into_outcome(),
            None => Ok(()),
        }
    }
}
