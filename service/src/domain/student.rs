//! [`Student`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Student living (or applying to live) in the dormitory.
///
/// Always backed by a [`User`] of the student role holding the credentials
/// and contact info.
#[derive(Clone, Debug)]
pub struct Student {
    /// ID of this [`Student`].
    pub id: Id,

    /// ID of the [`User`] this [`Student`] is backed by.
    pub user_id: user::Id,

    /// Display [`Name`] of this [`Student`].
    pub name: Name,

    /// [`College`] this [`Student`] attends, if known.
    pub college: Option<College>,

    /// [`DateTime`] when this [`Student`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Student`].
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

/// Name of a [`Student`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// College a [`Student`] attends.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct College(String);

impl College {
    /// Creates a new [`College`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `college` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(college: impl Into<String>) -> Self {
        Self(college.into())
    }

    /// Creates a new [`College`] if the given `college` is valid.
    #[must_use]
    pub fn new(college: impl Into<String>) -> Option<Self> {
        let college = college.into();
        Self::check(&college).then_some(Self(college))
    }

    /// Checks whether the given `college` is a valid [`College`].
    fn check(college: impl AsRef<str>) -> bool {
        let college = college.as_ref();
        college.trim() == college && !college.is_empty() && college.len() <= 512
    }
}

impl FromStr for College {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `College`")
    }
}

/// [`DateTime`] when a [`Student`] was created.
pub type CreationDateTime = DateTimeOf<(Student, unit::Creation)>;
