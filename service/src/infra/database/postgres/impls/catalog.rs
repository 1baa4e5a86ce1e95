//! Catalog-related [`Database`] implementations: [`Building`]s and
//! [`Amenity`]s are read-only referential inputs here.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{amenity, building, Amenity, Building},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Building>, building::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Building>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Building>, building::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: building::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, address \
            FROM buildings \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Building {
                id: row.get("id"),
                name: row.get("name"),
                address: row.get("address"),
            }))
    }
}

impl<C> Database<Select<By<Vec<Amenity>, Vec<amenity::Id>>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Amenity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Amenity>, Vec<amenity::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        const SQL: &str = "\
            SELECT id, name, description, icon \
            FROM amenities \
            WHERE id = ANY($1::UUID[])";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Amenity {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                icon: row.get("icon"),
            })
            .collect())
    }
}
