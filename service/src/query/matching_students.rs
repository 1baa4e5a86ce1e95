//! [`Query`] for matching [`Student`]s by a [`Room`]'s traits.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{amenity, room, user, Preference},
    infra::{database, Database},
    read,
    Service,
};
#[cfg(doc)]
use crate::domain::{Room, Student};

use super::Query;

/// [`Query`] for IDs of [`User`]s whose declared [`Preference`]s match a
/// [`Room`] of the provided kind and amenity set.
///
/// Used to tell [`Student`]s that a [`Room`] they could be interested in has
/// appeared.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct MatchingStudents {
    /// [`room::Kind`] of the [`Room`] being matched.
    pub room_kind: Option<room::Kind>,

    /// IDs of [`amenity::Amenity`]s the [`Room`] offers.
    pub amenities: Vec<amenity::Id>,
}

impl<Db> Query<MatchingStudents> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Preference>, read::preference::OfActiveStudents>>,
        Ok = Vec<Preference>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<user::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        query: MatchingStudents,
    ) -> Result<Self::Ok, Self::Err> {
        let MatchingStudents {
            room_kind,
            amenities,
        } = query;

        Ok(self
            .database()
            .execute(Select(By::new(read::preference::OfActiveStudents)))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .filter(|preference| preference.matches(room_kind, &amenities))
            .map(|preference| preference.user_id)
            .collect())
    }
}
