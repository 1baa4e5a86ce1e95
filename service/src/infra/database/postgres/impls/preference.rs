//! [`Preference`]-related [`Database`] implementations.

use common::operations::{By, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, Preference},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Preference>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Preference>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Preference>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT user_id, room_kind, amenities \
            FROM preferences \
            WHERE user_id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Preference {
                user_id: row.get("user_id"),
                room_kind: row.get("room_kind"),
                amenities: row.get("amenities"),
            }))
    }
}

impl<C> Database<Select<By<Vec<Preference>, read::preference::OfActiveStudents>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Preference>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Preference>, read::preference::OfActiveStudents>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::preference::OfActiveStudents = by.into_inner();

        const SQL: &str = "\
            SELECT p.user_id, p.room_kind, p.amenities \
            FROM preferences AS p \
            JOIN users AS u ON u.id = p.user_id \
            WHERE u.role = $1::INT2 \
              AND u.is_active";
        Ok(self
            .query(SQL, &[&user::Role::Student])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Preference {
                user_id: row.get("user_id"),
                room_kind: row.get("room_kind"),
                amenities: row.get("amenities"),
            })
            .collect())
    }
}

impl<C> Database<Update<Preference>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(preference): Update<Preference>,
    ) -> Result<Self::Ok, Self::Err> {
        let Preference {
            user_id,
            room_kind,
            amenities,
        } = preference;

        const SQL: &str = "\
            INSERT INTO preferences (user_id, room_kind, amenities) \
            VALUES ($1::UUID, $2::INT2, $3::UUID[]) \
            ON CONFLICT (user_id) DO UPDATE \
            SET room_kind = EXCLUDED.room_kind, \
                amenities = EXCLUDED.amenities";
        self.exec(SQL, &[&user_id, &room_kind, &amenities])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
