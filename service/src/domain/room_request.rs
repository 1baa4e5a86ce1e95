//! [`RoomRequest`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{room, student};
#[cfg(doc)]
use crate::domain::{Room, Student};

/// [`Student`]-initiated interest in a [`Room`], awaiting an admin decision.
///
/// At most one [`Status::Pending`] request may exist per ([`Room`],
/// [`Student`]) pair.
#[derive(Clone, Debug)]
pub struct RoomRequest {
    /// ID of this [`RoomRequest`].
    pub id: Id,

    /// ID of the requested [`Room`].
    pub room_id: room::Id,

    /// ID of the requesting [`Student`].
    pub student_id: student::Id,

    /// Current [`Status`] of this [`RoomRequest`].
    pub status: Status,

    /// Free-text [`Notes`] accompanying this [`RoomRequest`].
    pub notes: Option<Notes>,

    /// [`DateTime`] when this [`RoomRequest`] was created.
    pub created_at: CreationDateTime,
}

impl RoomRequest {
    /// Creates a new [`Status::Pending`] [`RoomRequest`].
    #[must_use]
    pub fn new(
        room_id: room::Id,
        student_id: student::Id,
        notes: Option<Notes>,
        created_at: CreationDateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            room_id,
            student_id,
            status: Status::Pending,
            notes,
            created_at,
        }
    }

    /// Returns whether this [`RoomRequest`] is still awaiting a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }
}

/// ID of a [`RoomRequest`].
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

define_kind! {
    #[doc = "Status of a [`RoomRequest`]."]
    enum Status {
        #[doc = "Awaiting an admin decision."]
        Pending = 1,

        #[doc = "Accepted by an admin; the `Student` was placed."]
        Accepted = 2,

        #[doc = "Rejected by an admin, or invalidated by an acceptance \
                 elsewhere."]
        Rejected = 3,
    }
}

/// Free-text notes of a [`RoomRequest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Notes(String);

impl Notes {
    /// Creates a new [`Notes`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `notes` match the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }

    /// Creates a new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        !notes.trim().is_empty() && notes.len() <= 2048
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// Payload of the operation rejecting every pending [`RoomRequest`] of a
/// [`Student`] except the one being accepted.
///
/// Executed via [`Perform`] inside the acceptance transaction.
///
/// [`Perform`]: common::operations::Perform
#[derive(Clone, Copy, Debug)]
pub struct RejectSiblings {
    /// ID of the [`Student`] whose pending requests are rejected.
    pub student_id: student::Id,

    /// ID of the accepted [`RoomRequest`] to leave untouched.
    pub except: Id,
}

/// [`DateTime`] when a [`RoomRequest`] was created.
pub type CreationDateTime = DateTimeOf<(RoomRequest, unit::Creation)>;
