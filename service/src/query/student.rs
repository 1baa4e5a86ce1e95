//! [`Query`] collection related to a single [`Student`].

use common::operations::By;

use crate::domain::{student, user, Student};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries a [`Student`] by their [`student::Id`].
pub type ById = DatabaseQuery<By<Option<Student>, student::Id>>;

/// Queries a [`Student`] by the ID of their backing [`User`].
pub type ByUserId = DatabaseQuery<By<Option<Student>, user::Id>>;
