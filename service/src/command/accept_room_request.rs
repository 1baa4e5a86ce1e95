//! [`Command`] for accepting a [`RoomRequest`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Perform, Select, Transact, Transacted,
        Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        notification::{self, Notify, Related, Target},
        room, room_request::{self, RejectSiblings},
        student, Assignment, Payment, Room, RoomRequest, Student,
    },
    infra::{database, Database},
    read::assignment::Active,
    Service,
};

use super::Command;

/// [`Command`] for accepting a pending [`RoomRequest`].
///
/// The whole pipeline is a single transaction: capacity is re-checked under
/// the locked [`Room`] row, any current [`Assignment`] of the [`Student`] is
/// closed and its bed released first, the new [`Assignment`] is opened with a
/// [`Payment`], and every other pending [`RoomRequest`] of the same
/// [`Student`] is rejected. A failure at any step leaves no partial state
/// behind.
#[derive(Clone, Copy, Debug)]
pub struct AcceptRoomRequest {
    /// ID of the [`RoomRequest`] to accept.
    pub request_id: room_request::Id,
}

/// Output of [`AcceptRoomRequest`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// The accepted [`RoomRequest`].
    pub request: RoomRequest,

    /// The created [`Assignment`].
    pub assignment: Assignment,

    /// The occupied [`Room`] with its capacity already decremented.
    pub room: Room,

    /// The opened [`Payment`].
    pub payment: Payment,
}

impl<Db> Command<AcceptRoomRequest> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<RoomRequest>, room_request::Id>>,
            Ok = Option<RoomRequest>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Student>, student::Id>>,
            Ok = Option<Student>,
            Err = Traced<database::Error>,
        > + Database<Perform<Notify>, Ok = (), Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<RoomRequest, room_request::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<RoomRequest>, room_request::Id>>,
            Ok = Option<RoomRequest>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
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
        > + Database<Update<Assignment>, Err = Traced<database::Error>>
        + Database<Insert<Assignment>, Err = Traced<database::Error>>
        + Database<Update<Room>, Err = Traced<database::Error>>
        + Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Update<RoomRequest>, Err = Traced<database::Error>>
        + Database<
            Perform<RejectSiblings>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AcceptRoomRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptRoomRequest { request_id } = cmd;

        let request = self
            .database()
            .execute(Select(By::<Option<RoomRequest>, _>::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RequestNotExists(request_id))
            .map_err(tracerr::wrap!())?;
        if !request.is_pending() {
            return Err(tracerr::new!(E::RequestNotPending(request_id)));
        }

        let student = self
            .database()
            .execute(Select(By::<Option<Student>, _>::new(request.student_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::StudentNotExists(request.student_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize concurrent decisions upon the same `RoomRequest`.
        tx.execute(Lock(By::<RoomRequest, _>::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut request = tx
            .execute(Select(By::<Option<RoomRequest>, _>::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RequestNotExists(request_id))
            .map_err(tracerr::wrap!())?;
        if !request.is_pending() {
            return Err(tracerr::new!(E::RequestNotPending(request_id)));
        }

        // Serialize concurrent placements into the same `Room`, then re-check
        // the capacity: beds may have run out since the request was made.
        tx.execute(Lock(By::<Room, _>::new(request.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut room = tx
            .execute(Select(By::<Option<Room>, _>::new(request.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(request.room_id))
            .map_err(tracerr::wrap!())?;
        if room.available_beds == 0 {
            return Err(tracerr::new!(E::RoomFull(room.id)));
        }

        tx.execute(Lock(By::<Student, _>::new(student.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Close the old `Assignment` (releasing its bed) before opening the
        // new one, so no other transaction can ever observe two active ones.
        let existing = tx
            .execute(Select(By::<Option<Active<Assignment>>, _>::new(
                student.id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(Active(mut existing)) = existing {
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
            DateTime::now().coerce(),
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

        let amount_due = room
            .price_per_occupant()
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

        request.status = room_request::Status::Accepted;
        tx.execute(Update(request.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // An acceptance anywhere invalidates every other outstanding request
        // of the `Student`.
        tx.execute(Perform(RejectSiblings {
            student_id: student.id,
            except: request.id,
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        super::notify(
            self.database(),
            Notify {
                target: Target::User(student.user_id),
                kind: notification::Kind::RequestAccepted,
                title: "Room request accepted".to_owned(),
                message: format!(
                    "Your request for room {} was accepted",
                    room.number,
                ),
                related: Some(Related {
                    id: room.id.into(),
                    kind: notification::RelatedKind::Room,
                }),
            },
        )
        .await;

        Ok(Output {
            request,
            assignment,
            room,
            payment,
        })
    }
}

/// Error of [`AcceptRoomRequest`] [`Command`] execution.
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

    /// [`RoomRequest`] with the provided ID does not exist.
    #[display("`RoomRequest(id: {_0})` does not exist")]
    RequestNotExists(#[error(not(source))] room_request::Id),

    /// [`RoomRequest`] is not pending anymore.
    #[display("`RoomRequest(id: {_0})` is not pending")]
    RequestNotPending(#[error(not(source))] room_request::Id),

    /// [`Room`] has no available beds anymore.
    #[display("`Room(id: {_0})` has no available beds")]
    RoomFull(#[error(not(source))] room::Id),

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Room`] has no price to derive the [`Payment`] due amount from.
    #[display("`Room(id: {_0})` has no price defined for its kind")]
    RoomPriceUndefined(#[error(not(source))] room::Id),

    /// [`Student`] of the [`RoomRequest`] does not exist.
    #[display("`Student(id: {_0})` does not exist")]
    StudentNotExists(#[error(not(source))] student::Id),
}
