//! [`Room`] read model definitions.

use derive_more::{From, Into};

use crate::domain::{room, Assignment, Payment, Student};
#[cfg(doc)]
use crate::domain::Room;

/// Indicator of a [`Room`] having at least one active [`Assignment`].
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct HasActiveAssignments(pub bool);

/// Next free integer [`room::Number`], for auto-assignment at [`Room`]
/// creation.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct NextNumber(pub i64);

/// A [`Student`] occupying (or having occupied) a bed in a [`Room`], with the
/// [`Payment`] of their stay.
#[derive(Clone, Debug)]
pub struct Occupant {
    /// The occupancy record itself.
    pub assignment: Assignment,

    /// The occupying [`Student`].
    pub student: Student,

    /// [`Payment`] of the stay, if one was opened.
    pub payment: Option<Payment>,
}

/// Selector of [`Occupant`]s of a [`Room`].
#[derive(Clone, Copy, Debug)]
pub struct OccupantsSelector {
    /// ID of the [`Room`] to list [`Occupant`]s of.
    pub room_id: room::Id,

    /// Indicator whether closed assignments are included.
    pub include_inactive: bool,
}

/// Selector of [`Room`]s a [`Student`] could request: available or partially
/// occupied ones, optionally narrowed to a [`room::Kind`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Candidates {
    /// [`room::Kind`] to narrow the candidates to.
    pub kind: Option<room::Kind>,
}

/// A candidate [`Room`] matched against a [`Student`]'s preferences.
#[derive(Clone, Debug)]
pub struct Match {
    /// The matched [`Room`].
    pub room: room::Room,

    /// Status of the [`Student`]'s request for this [`Room`], if they made
    /// one.
    pub request_status: Option<crate::domain::room_request::Status>,
}

pub mod list {
    //! [`Room`]s list definitions.

    use common::define_pagination;

    use crate::domain::{building, room, Room};

    define_pagination!(Node, Filter);

    /// Node in a [`Page`].
    pub type Node = Room;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`room::Status`] to filter by.
        pub status: Option<room::Status>,

        /// [`room::Kind`] to filter by.
        pub kind: Option<room::Kind>,

        /// [`building::Id`] to filter by.
        pub building_id: Option<building::Id>,

        /// Floor to filter by.
        pub floor: Option<room::Floor>,
    }
}
