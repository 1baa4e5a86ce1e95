//! [`Assignment`] read model definition.

#[cfg(doc)]
use crate::domain::Assignment;

/// Wrapper around an [`Assignment`] indicating that it [`is_active`].
///
/// [`is_active`]: Assignment::is_active
#[derive(Clone, Copy, Debug)]
pub struct Active<T>(pub T);
