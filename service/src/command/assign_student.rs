//! [`Command`] for assigning a [`Student`] to a [`Room`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted,
                 Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{assignment, room, student, Assignment, Payment, Room, Student},
    infra::{database, Database},
    read::assignment::Active,
    Service,
};

use super::Command;

/// [`Command`] for assigning a [`Student`] to a [`Room`] directly by an
/// admin.
#[derive(Clone, Copy, Debug)]
pub struct AssignStudent {
    /// ID of the [`Room`] to assign into.
    pub room_id: room::Id,

    /// ID of the [`Student`] to assign.
    pub student_id: student::Id,

    /// [`DateTime`] of the check-in, defaulting to now.
    ///
    /// [`DateTime`]: common::DateTime
    pub check_in_at: Option<assignment::CheckInDateTime>,

    /// Due amount override for the opened [`Payment`].
    ///
    /// Defaults to the [`Room`]'s price per occupant.
    pub amount_due: Option<Money>,

    /// Indicator whether an existing active [`Assignment`] of the [`Student`]
    /// is closed first instead of failing the command.
    pub force_checkout: bool,
}

/// Output of [`AssignStudent`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// The created [`Assignment`].
    pub assignment: Assignment,

    /// The occupied [`Room`] with its capacity already decremented.
    pub room: Room,

    /// The assigned [`Student`].
    pub student: Student,

    /// The opened [`Payment`].
    pub payment: Payment,
}

impl<Db> Command<AssignStudent> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Student>, student::Id>>,
            Ok = Option<Student>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Student, student::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Assignment>>, student::Id>>,
            Ok = Option<Active<Assignment>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Assignment>, Err = Traced<database::Error>>
        + Database<Update<Assignment>, Err = Traced<database::Error>>
        + Database<Update<Room>, Err = Traced<database::Error>>
        + Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AssignStudent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AssignStudent {
            room_id,
            student_id,
            check_in_at,
            amount_due,
            force_checkout,
        } = cmd;

        let student = self
            .database()
            .execute(Select(By::<Option<Student>, _>::new(student_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::StudentNotExists(student_id))
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize concurrent placements into the same `Room`.
        tx.execute(Lock(By::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut room = tx
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        if room.status == room::Status::Maintenance {
            return Err(tracerr::new!(E::RoomUnderMaintenance(room_id)));
        }
        if room.available_beds == 0 {
            return Err(tracerr::new!(E::RoomFull(room_id)));
        }

        // Serialize against other workflows placing this `Student`.
        tx.execute(Lock(By::<Student, _>::new(student_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<Active<Assignment>>, _>::new(
                student_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(Active(mut existing)) = existing {
            if !force_checkout {
                return Err(tracerr::new!(E::StudentAlreadyAssigned(
                    student_id
                )));
            }

            // The old `Assignment` is closed before the new one is opened, so
            // no other transaction can ever observe two active ones.
            existing.close(DateTime::now().coerce());
            tx.execute(Update(existing))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            if existing.room_id == room.id {
                room.apply_capacity_delta(1)
                    .map_err(tracerr::from_and_wrap!(=> E))?;
            } else {
                tx.execute(Lock(By::<Room, _>::new(existing.room_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                let mut old_room = tx
                    .execute(Select(By::<Option<Room>, _>::new(
                        existing.room_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::RoomNotExists(existing.room_id))
                    .map_err(tracerr::wrap!())?;
                old_room
                    .apply_capacity_delta(1)
                    .map_err(tracerr::from_and_wrap!(=> E))?;
                tx.execute(Update(old_room))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
        }

        let assignment = Assignment::new(
            room.id,
            student.id,
            check_in_at.unwrap_or_else(|| DateTime::now().coerce()),
        );
        room.apply_capacity_delta(-1)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Insert(assignment))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let amount_due = amount_due
            .or_else(|| room.price_per_occupant())
            .ok_or(E::RoomPriceUndefined(room.id))
            .map_err(tracerr::wrap!())?;
        let payment = Payment::open(
            &assignment.id,
            room.id,
            student.id,
            amount_due,
            DateTime::now().coerce(),
        );
        tx.execute(Insert(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output {
            assignment,
            room,
            student,
            payment,
        })
    }
}

/// Error of [`AssignStudent`] [`Command`] execution.
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

    /// [`Room`] has no available beds.
    #[display("`Room(id: {_0})` has no available beds")]
    RoomFull(#[error(not(source))] room::Id),

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Room`] has no price to derive the [`Payment`] due amount from.
    #[display("`Room(id: {_0})` has no price defined for its kind")]
    RoomPriceUndefined(#[error(not(source))] room::Id),

    /// [`Room`] is under maintenance.
    #[display("`Room(id: {_0})` is under maintenance")]
    RoomUnderMaintenance(#[error(not(source))] room::Id),

    /// [`Student`] already holds an active [`Assignment`].
    #[display(
        "`Student(id: {_0})` is already assigned to a room, \
         check out first"
    )]
    StudentAlreadyAssigned(#[error(not(source))] student::Id),

    /// [`Student`] with the provided ID does not exist.
    #[display("`Student(id: {_0})` does not exist")]
    StudentNotExists(#[error(not(source))] student::Id),
}
