//! [`Query`] collection related to a single [`Assignment`].

use common::operations::By;

use crate::{
    domain::{student, Assignment},
    read::assignment::Active,
};
#[cfg(doc)]
use crate::{domain::Student, Query};

use super::DatabaseQuery;

/// Queries the active [`Assignment`] of a [`Student`], if any.
pub type ActiveByStudent =
    DatabaseQuery<By<Option<Active<Assignment>>, student::Id>>;
