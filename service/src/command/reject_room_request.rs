//! [`Command`] for rejecting a [`RoomRequest`].

use common::operations::{
    By, Commit, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        notification::{self, Notify, Related, Target},
        room, room_request, student, Room, RoomRequest, Student,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for rejecting a pending [`RoomRequest`].
///
/// Has no capacity side effects.
#[derive(Clone, Copy, Debug)]
pub struct RejectRoomRequest {
    /// ID of the [`RoomRequest`] to reject.
    pub request_id: room_request::Id,
}

impl<Db> Command<RejectRoomRequest> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<RoomRequest>, room_request::Id>>,
            Ok = Option<RoomRequest>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
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
        > + Database<Update<RoomRequest>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RoomRequest;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RejectRoomRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectRoomRequest { request_id } = cmd;

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
        let room = self
            .database()
            .execute(Select(By::<Option<Room>, _>::new(request.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(request.room_id))
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

        request.status = room_request::Status::Rejected;
        tx.execute(Update(request.clone()))
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
                kind: notification::Kind::RequestRejected,
                title: "Room request rejected".to_owned(),
                message: format!(
                    "Your request for room {} was rejected",
                    room.number,
                ),
                related: Some(Related {
                    id: room.id.into(),
                    kind: notification::RelatedKind::Room,
                }),
            },
        )
        .await;

        Ok(request)
    }
}

/// Error of [`RejectRoomRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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

    /// [`Room`] of the [`RoomRequest`] does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Student`] of the [`RoomRequest`] does not exist.
    #[display("`Student(id: {_0})` does not exist")]
    StudentNotExists(#[error(not(source))] student::Id),
}
