//! [`Student`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{student, user, Student},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `students` table selected for a [`Student`].
const STUDENT_COLUMNS: &str = "id, user_id, name, college, created_at";

/// Builds a [`Student`] out of a [`Row`] selected with [`STUDENT_COLUMNS`].
fn student_from_row(row: &Row) -> Student {
    Student {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        college: row.get("college"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Student>, student::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Student>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Student>, student::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: student::Id = by.into_inner();

        let sql = format!(
            "SELECT {STUDENT_COLUMNS} \
             FROM students \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| student_from_row(&row)))
    }
}

impl<C> Database<Select<By<Option<Student>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Student>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Student>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {STUDENT_COLUMNS} \
             FROM students \
             WHERE user_id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| student_from_row(&row)))
    }
}

impl<C> Database<Insert<Student>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(student): Insert<Student>,
    ) -> Result<Self::Ok, Self::Err> {
        let Student {
            id,
            user_id,
            name,
            college,
            created_at,
        } = student;

        const SQL: &str = "\
            INSERT INTO students (id, user_id, name, college, created_at) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, \
                $5::TIMESTAMPTZ \
            )";
        self.exec(SQL, &[&id, &user_id, &name, &college, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Student, student::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Student, student::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: student::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM students \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
