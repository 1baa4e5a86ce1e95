//! [`Notification`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{Payment, Room, RoomRequest, User};

/// Message delivered to a [`User`] about something that happened in the
/// system.
///
/// The allocation workflows treat notification delivery as fire-and-forget: a
/// failed delivery never fails the workflow that produced it.
#[derive(Clone, Debug)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// ID of the [`User`] this [`Notification`] is addressed to.
    pub user_id: user::Id,

    /// [`Kind`] of this [`Notification`].
    pub kind: Kind,

    /// Short title of this [`Notification`].
    pub title: String,

    /// Full message of this [`Notification`].
    pub message: String,

    /// Entity this [`Notification`] is about, if any.
    pub related: Option<Related>,

    /// Indicator whether the [`User`] has read this [`Notification`].
    pub is_read: bool,

    /// [`DateTime`] when this [`Notification`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Notification`].
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
    #[doc = "Kind of a [`Notification`]."]
    enum Kind {
        #[doc = "A `Student` requested a `Room`."]
        RoomRequested = 1,

        #[doc = "A `RoomRequest` was accepted."]
        RequestAccepted = 2,

        #[doc = "A `RoomRequest` was rejected."]
        RequestRejected = 3,

        #[doc = "A `Room` matching declared preferences appeared."]
        RoomMatched = 4,
    }
}

/// Entity a [`Notification`] is about.
#[derive(Clone, Copy, Debug)]
pub struct Related {
    /// ID of the related entity.
    pub id: Uuid,

    /// [`RelatedKind`] of the related entity.
    pub kind: RelatedKind,
}

define_kind! {
    #[doc = "Kind of an entity a [`Notification`] is about."]
    enum RelatedKind {
        #[doc = "A [`Room`]."]
        Room = 1,

        #[doc = "A [`RoomRequest`]."]
        Request = 2,

        #[doc = "A [`Payment`]."]
        Payment = 3,
    }
}

/// Addressing of a [`Notify`] operation.
#[derive(Clone, Copy, Debug)]
pub enum Target {
    /// A single [`User`].
    User(user::Id),

    /// Every active [`User`] with the admin role.
    Admins,
}

/// Payload of the notification sink operation: who to notify and with what.
///
/// Executed via [`Perform`] against the [`Database`], producing one
/// [`Notification`] row per addressed [`User`].
///
/// [`Database`]: crate::infra::Database
/// [`Perform`]: common::operations::Perform
#[derive(Clone, Debug)]
pub struct Notify {
    /// [`Target`] to deliver to.
    pub target: Target,

    /// [`Kind`] of the produced [`Notification`]s.
    pub kind: Kind,

    /// Title of the produced [`Notification`]s.
    pub title: String,

    /// Message of the produced [`Notification`]s.
    pub message: String,

    /// Entity the produced [`Notification`]s are about, if any.
    pub related: Option<Related>,
}

/// [`DateTime`] when a [`Notification`] was created.
pub type CreationDateTime = DateTimeOf<(Notification, unit::Creation)>;
