//! [`RoomRequest`] read model definitions.

#[cfg(doc)]
use crate::domain::{RoomRequest, room_request::Status};

/// Wrapper around a [`RoomRequest`] indicating that it is [`Status::Pending`].
#[derive(Clone, Debug)]
pub struct Pending<T>(pub T);

pub mod list {
    //! [`RoomRequest`]s list definitions.

    use common::define_pagination;

    use crate::domain::{
        room, room_request, student, Room, RoomRequest, Student,
    };

    define_pagination!(Node, Filter);

    /// Node in a [`Page`]: a request with the [`Room`] and [`Student`] it
    /// links.
    #[derive(Clone, Debug)]
    pub struct Node {
        /// The request itself.
        pub request: RoomRequest,

        /// The requested [`Room`].
        pub room: Room,

        /// The requesting [`Student`].
        pub student: Student,
    }

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`room::Id`] to filter by.
        pub room_id: Option<room::Id>,

        /// [`student::Id`] to filter by.
        pub student_id: Option<student::Id>,

        /// [`room_request::Status`] to filter by.
        pub status: Option<room_request::Status>,
    }
}
