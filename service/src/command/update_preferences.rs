//! [`Command`] for updating a [`User`]'s [`Preference`]s.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{amenity, room, user, Amenity, Preference},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for declaring (or re-declaring) a [`User`]'s housing
/// [`Preference`]s.
///
/// Absent fields are left untouched; a missing [`Preference`] record is
/// created.
#[derive(Clone, Debug)]
pub struct UpdatePreferences {
    /// ID of the [`User`] declaring the [`Preference`]s.
    pub user_id: user::Id,

    /// New preferred [`room::Kind`] (`Some(None)` clears it).
    pub room_kind: Option<Option<room::Kind>>,

    /// New set of desired [`Amenity`] IDs.
    pub amenities: Option<Vec<amenity::Id>>,
}

impl<Db> Command<UpdatePreferences> for Service<Db>
where
    Db: Database<
            Select<By<Option<Preference>, user::Id>>,
            Ok = Option<Preference>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Amenity>, Vec<amenity::Id>>>,
            Ok = Vec<Amenity>,
            Err = Traced<database::Error>,
        > + Database<Update<Preference>, Err = Traced<database::Error>>,
{
    type Ok = Preference;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdatePreferences,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdatePreferences {
            user_id,
            room_kind,
            amenities,
        } = cmd;

        let amenities = match amenities {
            Some(mut ids) => {
                ids.sort_unstable_by_key(|id| uuid::Uuid::from(*id));
                ids.dedup();
                if !ids.is_empty() {
                    let known = self
                        .database()
                        .execute(Select(By::<Vec<Amenity>, _>::new(
                            ids.clone(),
                        )))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?;
                    if let Some(missing) = ids
                        .iter()
                        .find(|id| !known.iter().any(|a| a.id == **id))
                    {
                        return Err(tracerr::new!(E::AmenityNotExists(
                            *missing
                        )));
                    }
                }
                Some(ids)
            }
            None => None,
        };

        let mut preference = self
            .database()
            .execute(Select(By::<Option<Preference>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .unwrap_or_else(|| Preference::empty(user_id));

        if let Some(room_kind) = room_kind {
            preference.room_kind = room_kind;
        }
        if let Some(amenities) = amenities {
            preference.amenities = amenities;
        }

        self.database()
            .execute(Update(preference.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(preference)
    }
}

/// Error of [`UpdatePreferences`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
