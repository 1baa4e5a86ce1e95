//! [`Assignment`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{student, Assignment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::assignment::Active,
};

impl<C> Database<Select<By<Option<Active<Assignment>>, student::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Assignment>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Assignment>>, student::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let student_id: student::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, room_id, student_id, \
                   check_in_at, check_out_at, is_active \
            FROM assignments \
            WHERE student_id = $1::UUID \
              AND is_active \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&student_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| {
                Active(Assignment {
                    id: row.get("id"),
                    room_id: row.get("room_id"),
                    student_id: row.get("student_id"),
                    check_in_at: row.get("check_in_at"),
                    check_out_at: row.get("check_out_at"),
                    is_active: row.get("is_active"),
                })
            }))
    }
}

impl<C> Database<Insert<Assignment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Assignment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(assignment): Insert<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(assignment))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Assignment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(assignment): Update<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Assignment {
            id,
            room_id,
            student_id,
            check_in_at,
            check_out_at,
            is_active,
        } = assignment;

        const SQL: &str = "\
            INSERT INTO assignments (\
                id, room_id, student_id, \
                check_in_at, check_out_at, is_active \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::TIMESTAMPTZ, $5::TIMESTAMPTZ, $6::BOOL \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET room_id = EXCLUDED.room_id, \
                student_id = EXCLUDED.student_id, \
                check_in_at = EXCLUDED.check_in_at, \
                check_out_at = EXCLUDED.check_out_at, \
                is_active = EXCLUDED.is_active";
        self.exec(
            SQL,
            &[
                &id,
                &room_id,
                &student_id,
                &check_in_at,
                &check_out_at,
                &is_active,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
