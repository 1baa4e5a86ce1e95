//! [`Preference`] read model definitions.

#[cfg(doc)]
use crate::domain::{Preference, User};

/// Selector of all [`Preference`]s declared by active [`User`]s of the
/// student role.
///
/// Users without a [`Preference`] record are not represented at all, which
/// the preference matching relies upon.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfActiveStudents;
