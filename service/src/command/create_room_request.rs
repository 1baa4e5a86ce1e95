//! [`Command`] for creating a new [`RoomRequest`].

use common::{
    operations::{By, Insert, Perform, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        notification::{self, Notify, Related, Target},
        room, room_request, student, Assignment, Room, RoomRequest, Student,
    },
    infra::{database, Database},
    read::{assignment::Active, room_request::Pending},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`RoomRequest`] by a [`Student`].
#[derive(Clone, Debug)]
pub struct CreateRoomRequest {
    /// ID of the requesting [`Student`].
    pub student_id: student::Id,

    /// ID of the requested [`Room`].
    pub room_id: room::Id,

    /// Free-text [`room_request::Notes`] accompanying the request.
    pub notes: Option<room_request::Notes>,
}

/// Output of [`CreateRoomRequest`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// The created [`RoomRequest`].
    pub request: RoomRequest,

    /// The requested [`Room`].
    pub room: Room,

    /// The requesting [`Student`].
    pub student: Student,
}

impl<Db> Command<CreateRoomRequest> for Service<Db>
where
    Db: Database<
            Select<By<Option<Student>, student::Id>>,
            Ok = Option<Student>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Pending<RoomRequest>>, (room::Id, student::Id)>>,
            Ok = Option<Pending<RoomRequest>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Assignment>>, student::Id>>,
            Ok = Option<Active<Assignment>>,
            Err = Traced<database::Error>,
        > + Database<Insert<RoomRequest>, Err = Traced<database::Error>>
        + Database<Perform<Notify>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateRoomRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRoomRequest {
            student_id,
            room_id,
            notes,
        } = cmd;

        let student = self
            .database()
            .execute(Select(By::<Option<Student>, _>::new(student_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::StudentNotExists(student_id))
            .map_err(tracerr::wrap!())?;

        let room = self
            .database()
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        if room.available_beds == 0 {
            return Err(tracerr::new!(E::RoomFull(room_id)));
        }

        let pending = self
            .database()
            .execute(Select(By::<Option<Pending<RoomRequest>>, _>::new((
                room_id, student_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if pending.is_some() {
            return Err(tracerr::new!(E::AlreadyRequested(room_id)));
        }

        let assignment = self
            .database()
            .execute(Select(By::<Option<Active<Assignment>>, _>::new(
                student_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if assignment
            .is_some_and(|Active(assignment)| assignment.room_id == room_id)
        {
            return Err(tracerr::new!(E::AlreadyAssigned(room_id)));
        }

        let request = RoomRequest::new(
            room_id,
            student_id,
            notes,
            DateTime::now().coerce(),
        );
        self.database()
            .execute(Insert(request.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        super::notify(
            self.database(),
            Notify {
                target: Target::Admins,
                kind: notification::Kind::RoomRequested,
                title: "New room request".to_owned(),
                message: format!(
                    "Student {} requested room {}",
                    student.name, room.number,
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
            room,
            student,
        })
    }
}

/// Error of [`CreateRoomRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Student`] already occupies the requested [`Room`].
    #[display("already assigned to `Room(id: {_0})`")]
    AlreadyAssigned(#[error(not(source))] room::Id),

    /// A pending [`RoomRequest`] for this [`Room`] already exists.
    #[display("a pending request for `Room(id: {_0})` already exists")]
    AlreadyRequested(#[error(not(source))] room::Id),

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

    /// [`Student`] with the provided ID does not exist.
    #[display("`Student(id: {_0})` does not exist")]
    StudentNotExists(#[error(not(source))] student::Id),
}
