//! [`Assignment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::DateTimeOf;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{room, student};
#[cfg(doc)]
use crate::domain::{Room, Student};

/// Occupancy record of a [`Student`] living in a [`Room`].
///
/// Never deleted, only closed: the full set of [`Assignment`]s forms the
/// historical occupancy log.
#[derive(Clone, Copy, Debug)]
pub struct Assignment {
    /// ID of this [`Assignment`].
    pub id: Id,

    /// ID of the occupied [`Room`].
    pub room_id: room::Id,

    /// ID of the occupying [`Student`].
    pub student_id: student::Id,

    /// [`DateTime`] when the [`Student`] checked in.
    pub check_in_at: CheckInDateTime,

    /// [`DateTime`] when the [`Student`] checked out, if they did.
    pub check_out_at: Option<CheckOutDateTime>,

    /// Indicator whether the [`Student`] still occupies the bed.
    ///
    /// At most one active [`Assignment`] may exist per [`Student`] at any
    /// time.
    pub is_active: bool,
}

impl Assignment {
    /// Creates a new active [`Assignment`] of the provided [`Student`] to the
    /// provided [`Room`].
    #[must_use]
    pub fn new(
        room_id: room::Id,
        student_id: student::Id,
        check_in_at: CheckInDateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            room_id,
            student_id,
            check_in_at,
            check_out_at: None,
            is_active: true,
        }
    }

    /// Closes this [`Assignment`] at the provided [`DateTime`].
    pub fn close(&mut self, at: CheckOutDateTime) {
        self.is_active = false;
        self.check_out_at = Some(at);
    }
}

/// ID of an [`Assignment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Marker type indicating a check-in.
#[derive(Clone, Copy, Debug)]
pub struct CheckIn;

/// Marker type indicating a check-out.
#[derive(Clone, Copy, Debug)]
pub struct CheckOut;

/// [`DateTime`] when a [`Student`] checked into a [`Room`].
pub type CheckInDateTime = DateTimeOf<(Assignment, CheckIn)>;

/// [`DateTime`] when a [`Student`] checked out of a [`Room`].
pub type CheckOutDateTime = DateTimeOf<(Assignment, CheckOut)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{room, student, Assignment};

    #[test]
    fn close_clears_activity() {
        let mut assignment = Assignment::new(
            room::Id::new(),
            student::Id::new(),
            DateTime::now().coerce(),
        );
        assert!(assignment.is_active);
        assert!(assignment.check_out_at.is_none());

        assignment.close(DateTime::now().coerce());
        assert!(!assignment.is_active);
        assert!(assignment.check_out_at.is_some());
    }
}
