//! [`Command`] for checking a [`Student`] out of their [`Room`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{assignment, room, student, Assignment, Room, Student},
    infra::{database, Database},
    read::assignment::Active,
    Service,
};

use super::Command;

/// [`Command`] for checking a [`Student`] out of their current [`Room`].
///
/// The [`Payment`] of the stay is left untouched as historical record.
///
/// [`Payment`]: crate::domain::Payment
#[derive(Clone, Copy, Debug)]
pub struct CheckOutStudent {
    /// ID of the [`Student`] to check out.
    pub student_id: student::Id,

    /// [`DateTime`] of the check-out, defaulting to now.
    ///
    /// [`DateTime`]: common::DateTime
    pub check_out_at: Option<assignment::CheckOutDateTime>,
}

/// Output of [`CheckOutStudent`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// The closed [`Assignment`].
    pub assignment: Assignment,

    /// The released [`Room`] with its capacity already incremented.
    pub room: Room,
}

impl<Db> Command<CheckOutStudent> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Student>, student::Id>>,
            Ok = Option<Student>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Student, student::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Assignment>>, student::Id>>,
            Ok = Option<Active<Assignment>>,
            Err = Traced<database::Error>,
        > + Database<Update<Assignment>, Err = Traced<database::Error>>
        + Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Update<Room>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CheckOutStudent,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CheckOutStudent {
            student_id,
            check_out_at,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Student>, _>::new(student_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::StudentNotExists(student_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize against other workflows placing this `Student`.
        tx.execute(Lock(By::<Student, _>::new(student_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let Active(mut assignment) = tx
            .execute(Select(By::<Option<Active<Assignment>>, _>::new(
                student_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::StudentNotAssigned(student_id))
            .map_err(tracerr::wrap!())?;

        assignment
            .close(check_out_at.unwrap_or_else(|| DateTime::now().coerce()));
        tx.execute(Update(assignment))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Lock(By::<Room, _>::new(assignment.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut room = tx
            .execute(Select(By::<Option<Room>, _>::new(assignment.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(assignment.room_id))
            .map_err(tracerr::wrap!())?;
        room.apply_capacity_delta(1)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        tx.execute(Update(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output { assignment, room })
    }
}

/// Error of [`CheckOutStudent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Room`] capacity bounds were violated.
    #[display("`Room` capacity bounds violated: {_0}")]
    #[from]
    Capacity(room::CapacityError),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Room`] of the active [`Assignment`] does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Student`] has no active [`Assignment`].
    #[display("`Student(id: {_0})` is not assigned to any room")]
    StudentNotAssigned(#[error(not(source))] student::Id),

    /// [`Student`] with the provided ID does not exist.
    #[display("`Student(id: {_0})` does not exist")]
    StudentNotExists(#[error(not(source))] student::Id),
}
