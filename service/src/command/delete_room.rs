//! [`Command`] for deleting a [`Room`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Room`] by an admin.
///
/// Fails while any active [`Assignment`] references the [`Room`]; historical
/// records are removed along with it.
///
/// [`Assignment`]: crate::domain::Assignment
#[derive(Clone, Copy, Debug)]
pub struct DeleteRoom {
    /// ID of the [`Room`] to delete.
    pub room_id: room::Id,
}

impl<Db> Command<DeleteRoom> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::room::HasActiveAssignments, room::Id>>,
            Ok = read::room::HasActiveAssignments,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteRoom { room_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize against concurrent placements into this `Room`.
        tx.execute(Lock(By::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let room = tx
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        let read::room::HasActiveAssignments(occupied) = tx
            .execute(Select(By::<read::room::HasActiveAssignments, _>::new(
                room_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied {
            return Err(tracerr::new!(E::RoomOccupied(room_id)));
        }

        tx.execute(Delete(By::<Room, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(room)
    }
}

/// Error of [`DeleteRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Room`] still has active assignments.
    #[display(
        "`Room(id: {_0})` has active assignments, check the students out first"
    )]
    RoomOccupied(#[error(not(source))] room::Id),
}
