//! [`Query`] for matching [`Room`]s by a [`Student`]'s [`Preference`]s.

use std::collections::HashMap;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{student, user, Assignment, Preference, Room, RoomRequest},
    infra::{database, Database},
    read::{self, assignment::Active},
    Service,
};
#[cfg(doc)]
use crate::domain::Student;

use super::Query;

/// [`Query`] for [`Room`]s a [`Student`] could request, matched against their
/// declared [`Preference`]s.
///
/// Excludes the [`Room`] the [`Student`] currently occupies and annotates
/// each match with the status of the [`Student`]'s request for it, if any.
#[derive(Clone, Copy, Debug)]
pub struct MatchingRooms {
    /// ID of the [`Student`] to match [`Room`]s for.
    pub student_id: student::Id,

    /// ID of the [`User`] backing the [`Student`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,
}

impl<Db> Query<MatchingRooms> for Service<Db>
where
    Db: Database<
            Select<By<Option<Preference>, user::Id>>,
            Ok = Option<Preference>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Room>, read::room::Candidates>>,
            Ok = Vec<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Assignment>>, student::Id>>,
            Ok = Option<Active<Assignment>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<RoomRequest>, student::Id>>,
            Ok = Vec<RoomRequest>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<read::room::Match>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        query: MatchingRooms,
    ) -> Result<Self::Ok, Self::Err> {
        let MatchingRooms {
            student_id,
            user_id,
        } = query;

        let preference = self
            .database()
            .execute(Select(By::<Option<Preference>, _>::new(user_id)))
            .await
            .map_err(tracerr::wrap!())?
            .unwrap_or_else(|| Preference::empty(user_id));

        let candidates = self
            .database()
            .execute(Select(By::<Vec<Room>, _>::new(read::room::Candidates {
                kind: preference.room_kind,
            })))
            .await
            .map_err(tracerr::wrap!())?;

        let occupied_room_id = self
            .database()
            .execute(Select(By::<Option<Active<Assignment>>, _>::new(
                student_id,
            )))
            .await
            .map_err(tracerr::wrap!())?
            .map(|Active(assignment)| assignment.room_id);

        let request_statuses = self
            .database()
            .execute(Select(By::<Vec<RoomRequest>, _>::new(student_id)))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|request| (request.room_id, request.status))
            .collect::<HashMap<_, _>>();

        Ok(candidates
            .into_iter()
            .filter(|room| Some(room.id) != occupied_room_id)
            .filter(|room| {
                preference.matches(Some(room.kind), &room.amenities)
            })
            .map(|room| {
                let request_status = request_statuses.get(&room.id).copied();
                read::room::Match {
                    room,
                    request_status,
                }
            })
            .collect())
    }
}
