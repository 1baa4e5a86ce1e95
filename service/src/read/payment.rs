//! [`Payment`] read model definitions.

pub mod list {
    //! [`Payment`]s list definitions.

    use common::{define_pagination, DateTime};

    use crate::domain::{payment, room, student, Payment};

    define_pagination!(Node, Filter);

    /// Node in a [`Page`].
    pub type Node = Payment;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`payment::Status`] to filter by.
        pub status: Option<payment::Status>,

        /// [`payment::Method`] to filter by.
        pub method: Option<payment::Method>,

        /// [`room::Id`] to filter by.
        pub room_id: Option<room::Id>,

        /// [`student::Id`] to filter by.
        pub student_id: Option<student::Id>,

        /// Lower bound of the payment date.
        pub from: Option<DateTime>,

        /// Upper bound of the payment date.
        pub to: Option<DateTime>,
    }
}
