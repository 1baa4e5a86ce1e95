//! [`Query`] collection related to a single [`Preference`].

use common::operations::By;

use crate::domain::{user, Preference};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries the [`Preference`] record of a [`User`], if declared.
pub type ByUserId = DatabaseQuery<By<Option<Preference>, user::Id>>;
