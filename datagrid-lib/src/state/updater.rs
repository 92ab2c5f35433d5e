//! Literal-or-function updates.

use std::fmt;

use crate::error::ValidationError;

/// The next value of a view-state field: either given outright or computed
/// from the previous value.
///
/// # Example
///
/// ```
/// use datagrid_lib::state::Updater;
///
/// let literal: Updater<usize> = 3.into();
/// let bump = Updater::apply(|n: &usize| n + 1);
///
/// assert_eq!(literal.resolve(&0), Ok(3));
/// assert_eq!(bump.resolve(&3), Ok(4));
/// ```
pub enum Updater<T> {
    /// Replace the value.
    Value(T),
    /// Derive the value from the previous one.
    Apply(Box<dyn FnOnce(&T) -> T + Send>),
    /// Derive the value from the previous one, or refuse.
    TryApply(Box<dyn FnOnce(&T) -> Result<T, ValidationError> + Send>),
}

impl<T> Updater<T> {
    /// Wraps an update function.
    pub fn apply(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Self::Apply(Box::new(f))
    }

    /// Wraps a fallible update function. A refusal leaves the field untouched.
    pub fn try_apply(f: impl FnOnce(&T) -> Result<T, ValidationError> + Send + 'static) -> Self {
        Self::TryApply(Box::new(f))
    }

    /// Resolves the next value against the previous one.
    pub fn resolve(self, previous: &T) -> Result<T, ValidationError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Apply(f) => Ok(f(previous)),
            Self::TryApply(f) => f(previous),
        }
    }
}

impl<T> From<T> for Updater<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Apply(_) => f.write_str("Apply(..)"),
            Self::TryApply(_) => f.write_str("TryApply(..)"),
        }
    }
}
