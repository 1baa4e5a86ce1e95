//! [`Query`] collection related to a single [`Room`].

use common::operations::By;

use crate::{
    domain::{room, Room},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Room`] by its [`room::Id`].
pub type ById = DatabaseQuery<By<Option<Room>, room::Id>>;

/// Queries a [`Room`] by its [`room::Number`].
pub type ByNumber = DatabaseQuery<By<Option<Room>, room::Number>>;

/// Queries [`read::room::Occupant`]s of a [`Room`].
pub type Occupants = DatabaseQuery<
    By<Vec<read::room::Occupant>, read::room::OccupantsSelector>,
>;

/// Queries whether a [`Room`] has any active assignments.
pub type HasActiveAssignments =
    DatabaseQuery<By<read::room::HasActiveAssignments, room::Id>>;
