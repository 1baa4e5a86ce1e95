//! [`RoomRequest`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Perform, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        room, room_request::{self, RejectSiblings}, student, RoomRequest,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, room_request::Pending},
};

/// Columns of the `room_requests` table selected for a [`RoomRequest`].
const REQUEST_COLUMNS: &str =
    "id, room_id, student_id, status, notes, created_at";

/// Builds a [`RoomRequest`] out of a [`Row`] selected with
/// [`REQUEST_COLUMNS`].
fn request_from_row(row: &Row) -> RoomRequest {
    RoomRequest {
        id: row.get("id"),
        room_id: row.get("room_id"),
        student_id: row.get("student_id"),
        status: row.get("status"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<RoomRequest>, room_request::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<RoomRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RoomRequest>, room_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room_request::Id = by.into_inner();

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} \
             FROM room_requests \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| request_from_row(&row)))
    }
}

impl<C>
    Database<
        Select<By<Option<Pending<RoomRequest>>, (room::Id, student::Id)>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Pending<RoomRequest>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<Pending<RoomRequest>>, (room::Id, student::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (room_id, student_id) = by.into_inner();

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} \
             FROM room_requests \
             WHERE room_id = $1::UUID \
               AND student_id = $2::UUID \
               AND status = $3::INT2 \
             LIMIT 1",
        );
        Ok(self
            .query_opt(
                &sql,
                &[&room_id, &student_id, &room_request::Status::Pending],
            )
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Pending(request_from_row(&row))))
    }
}

impl<C> Database<Select<By<Vec<RoomRequest>, student::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RoomRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<RoomRequest>, student::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let student_id: student::Id = by.into_inner();

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} \
             FROM room_requests \
             WHERE student_id = $1::UUID \
             ORDER BY created_at DESC",
        );
        Ok(self
            .query(&sql, &[&student_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(request_from_row)
            .collect())
    }
}

impl<C> Database<Insert<RoomRequest>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<RoomRequest>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(request): Insert<RoomRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(request)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<RoomRequest>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(request): Update<RoomRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        let RoomRequest {
            id,
            room_id,
            student_id,
            status,
            notes,
            created_at,
        } = request;

        const SQL: &str = "\
            INSERT INTO room_requests (\
                id, room_id, student_id, status, notes, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, $5::TEXT, \
                $6::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET room_id = EXCLUDED.room_id, \
                student_id = EXCLUDED.student_id, \
                status = EXCLUDED.status, \
                notes = EXCLUDED.notes, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[&id, &room_id, &student_id, &status, &notes, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<RoomRequest, room_request::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<RoomRequest, room_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room_request::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM room_requests \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Perform<RejectSiblings>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Perform(op): Perform<RejectSiblings>,
    ) -> Result<Self::Ok, Self::Err> {
        let RejectSiblings {
            student_id,
            except,
        } = op;

        const SQL: &str = "\
            UPDATE room_requests \
            SET status = $1::INT2 \
            WHERE student_id = $2::UUID \
              AND status = $3::INT2 \
              AND id != $4::UUID";
        self.exec(
            SQL,
            &[
                &room_request::Status::Rejected,
                &student_id,
                &room_request::Status::Pending,
                &except,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<
                read::room_request::list::Page,
                read::room_request::list::Selector,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::room_request::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::room_request::list::Page,
                read::room_request::list::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use crate::domain::{Room, Student};

        let read::room_request::list::Selector {
            arguments,
            filter:
                read::room_request::list::Filter {
                    room_id,
                    student_id,
                    status,
                },
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let room_idx = room_id.as_ref().map(|r| {
            ps.push(r);
            ps.len()
        });
        let student_idx = student_id.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let filtering = format!(
            "{room} {student} {status}",
            room = room_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND rr.room_id = ${idx}::UUID"))
            }),
            student = student_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND rr.student_id = ${idx}::UUID"))
            }),
            status = status_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND rr.status = ${idx}::INT2"))
            }),
        );

        let count_sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM room_requests AS rr \
             WHERE true {filtering}",
        );
        let total = self
            .query_opt(&count_sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>(0));
        let total = usize::try_from(total).unwrap_or_default();

        let limit_idx = {
            ps.push(&limit);
            ps.len()
        };
        let offset_idx = {
            ps.push(&offset);
            ps.len()
        };
        let sql = format!(
            "SELECT rr.id, rr.room_id, rr.student_id, rr.status, rr.notes, \
                    rr.created_at, \
                    r.number, r.building_id, r.floor, r.kind, \
                    r.total_beds, r.available_beds, r.status AS room_status, \
                    r.room_price, r.room_price_currency, \
                    r.bed_price, r.bed_price_currency, \
                    r.description, r.images, \
                    ARRAY(SELECT amenity_id \
                          FROM room_amenities \
                          WHERE room_id = r.id) AS amenities, \
                    r.created_at AS room_created_at, \
                    s.user_id, s.name, s.college, \
                    s.created_at AS student_created_at \
             FROM room_requests AS rr \
             JOIN rooms AS r ON r.id = rr.room_id \
             JOIN students AS s ON s.id = rr.student_id \
             WHERE true {filtering} \
             ORDER BY rr.created_at DESC \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
        );
        let items = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let request = request_from_row(&row);
                let room = Room {
                    id: request.room_id,
                    number: row.get("number"),
                    building_id: row.get("building_id"),
                    floor: row
                        .get::<_, Option<i32>>("floor")
                        .map(u16::try_from)
                        .transpose()
                        .expect("`floor` overflow"),
                    kind: row.get("kind"),
                    total_beds: u16::try_from(
                        row.get::<_, i32>("total_beds"),
                    )
                    .expect("`total_beds` overflow"),
                    available_beds: u16::try_from(
                        row.get::<_, i32>("available_beds"),
                    )
                    .expect("`available_beds` overflow"),
                    status: row.get("room_status"),
                    room_price: row
                        .get::<_, Option<rust_decimal::Decimal>>("room_price")
                        .map(|amount| Money {
                            amount,
                            currency: row.get("room_price_currency"),
                        }),
                    bed_price: row
                        .get::<_, Option<rust_decimal::Decimal>>("bed_price")
                        .map(|amount| Money {
                            amount,
                            currency: row.get("bed_price_currency"),
                        }),
                    description: row.get("description"),
                    images: row.get("images"),
                    amenities: row.get("amenities"),
                    created_at: row.get("room_created_at"),
                };
                let student = Student {
                    id: request.student_id,
                    user_id: row.get("user_id"),
                    name: row.get("name"),
                    college: row.get("college"),
                    created_at: row.get("student_created_at"),
                };
                read::room_request::list::Node {
                    request,
                    room,
                    student,
                }
            })
            .collect::<Vec<_>>();

        Ok(read::room_request::list::Page::new(arguments, items, total))
    }
}
