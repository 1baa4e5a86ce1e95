//! [`Room`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `rooms` table selected for a [`Room`], with the amenity
/// set aggregated alongside.
const ROOM_COLUMNS: &str = "\
    id, number, building_id, floor, kind, \
    total_beds, available_beds, status, \
    room_price, room_price_currency, \
    bed_price, bed_price_currency, \
    description, images, \
    ARRAY(SELECT amenity_id \
          FROM room_amenities \
          WHERE room_id = rooms.id) AS amenities, \
    created_at";

/// Builds a [`Room`] out of a [`Row`] selected with [`ROOM_COLUMNS`].
fn room_from_row(row: &Row) -> Room {
    Room {
        id: row.get("id"),
        number: row.get("number"),
        building_id: row.get("building_id"),
        floor: row
            .get::<_, Option<i32>>("floor")
            .map(u16::try_from)
            .transpose()
            .expect("`floor` overflow"),
        kind: row.get("kind"),
        total_beds: u16::try_from(row.get::<_, i32>("total_beds"))
            .expect("`total_beds` overflow"),
        available_beds: u16::try_from(row.get::<_, i32>("available_beds"))
            .expect("`available_beds` overflow"),
        status: row.get("status"),
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
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Room>, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        let sql = format!(
            "SELECT {ROOM_COLUMNS} \
             FROM rooms \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| room_from_row(&row)))
    }
}

impl<C> Database<Select<By<Option<Room>, room::Number>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Number>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let number: room::Number = by.into_inner();

        let sql = format!(
            "SELECT {ROOM_COLUMNS} \
             FROM rooms \
             WHERE number = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&number])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| room_from_row(&row)))
    }
}

impl<C> Database<Insert<Room>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Room>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room): Insert<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(room)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Room>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(room): Update<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let Room {
            id,
            number,
            building_id,
            floor,
            kind,
            total_beds,
            available_beds,
            status,
            room_price,
            bed_price,
            description,
            images,
            amenities,
            created_at,
        } = room;

        let floor = floor.map(i32::from);
        let total_beds = i32::from(total_beds);
        let available_beds = i32::from(available_beds);
        let room_price_amount = room_price.map(|p| p.amount);
        let room_price_currency = room_price.map(|p| p.currency);
        let bed_price_amount = bed_price.map(|p| p.amount);
        let bed_price_currency = bed_price.map(|p| p.currency);

        const SQL: &str = "\
            INSERT INTO rooms (\
                id, number, building_id, floor, kind, \
                total_beds, available_beds, status, \
                room_price, room_price_currency, \
                bed_price, bed_price_currency, \
                description, images, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::UUID, $4::INT4, $5::INT2, \
                $6::INT4, $7::INT4, $8::INT2, \
                $9::NUMERIC, $10::INT2, \
                $11::NUMERIC, $12::INT2, \
                $13::TEXT, $14::VARCHAR[], \
                $15::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET number = EXCLUDED.number, \
                building_id = EXCLUDED.building_id, \
                floor = EXCLUDED.floor, \
                kind = EXCLUDED.kind, \
                total_beds = EXCLUDED.total_beds, \
                available_beds = EXCLUDED.available_beds, \
                status = EXCLUDED.status, \
                room_price = EXCLUDED.room_price, \
                room_price_currency = EXCLUDED.room_price_currency, \
                bed_price = EXCLUDED.bed_price, \
                bed_price_currency = EXCLUDED.bed_price_currency, \
                description = EXCLUDED.description, \
                images = EXCLUDED.images, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &number,
                &building_id,
                &floor,
                &kind,
                &total_beds,
                &available_beds,
                &status,
                &room_price_amount,
                &room_price_currency,
                &bed_price_amount,
                &bed_price_currency,
                &description,
                &images,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const DELETE_AMENITIES_SQL: &str = "\
            DELETE FROM room_amenities \
            WHERE room_id = $1::UUID";
        self.exec(DELETE_AMENITIES_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        if !amenities.is_empty() {
            const INSERT_AMENITIES_SQL: &str = "\
                INSERT INTO room_amenities (room_id, amenity_id) \
                SELECT $1::UUID, unnest($2::UUID[])";
            self.exec(INSERT_AMENITIES_SQL, &[&id, &amenities])
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        Ok(())
    }
}

impl<C> Database<Delete<By<Room, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM rooms \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Room, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rooms \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::room::HasActiveAssignments, room::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::room::HasActiveAssignments;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::room::HasActiveAssignments, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let room_id: room::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM assignments \
            WHERE room_id = $1::UUID \
              AND is_active \
            LIMIT 1";
        self.query_opt(SQL, &[&room_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|r| read::room::HasActiveAssignments(r.is_some()))
    }
}

impl<C> Database<Select<By<read::room::NextNumber, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::room::NextNumber;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::room::NextNumber, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COALESCE(MAX(number::INT8), 0) + 1 \
            FROM rooms \
            WHERE number ~ '^[0-9]+$'";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                row.map_or(read::room::NextNumber(1), |row| {
                    read::room::NextNumber(row.get(0))
                })
            })
    }
}

impl<C> Database<Select<By<Vec<Room>, read::room::Candidates>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, read::room::Candidates>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::room::Candidates { kind } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> =
            vec![&room::Status::Available, &room::Status::Occupied];
        let kind_idx = kind.as_ref().map(|k| {
            ps.push(k);
            ps.len()
        });

        let sql = format!(
            "SELECT {ROOM_COLUMNS} \
             FROM rooms \
             WHERE status IN ($1::INT2, $2::INT2) \
                   {kind_filtering} \
             ORDER BY number ASC",
            kind_filtering = kind_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND kind = ${idx}::INT2"))
            }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(room_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::room::list::Page, read::room::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::room::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::room::list::Page, read::room::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::room::list::Selector {
            arguments,
            filter:
                read::room::list::Filter {
                    status,
                    kind,
                    building_id,
                    floor,
                },
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
        let floor = floor.map(i32::from);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let kind_idx = kind.as_ref().map(|k| {
            ps.push(k);
            ps.len()
        });
        let building_idx = building_id.as_ref().map(|b| {
            ps.push(b);
            ps.len()
        });
        let floor_idx = floor.as_ref().map(|f| {
            ps.push(f);
            ps.len()
        });

        let filtering = format!(
            "{status} {kind} {building} {floor}",
            status = status_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND status = ${idx}::INT2"))
            }),
            kind = kind_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND kind = ${idx}::INT2"))
            }),
            building = building_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND building_id = ${idx}::UUID"))
            }),
            floor = floor_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND floor = ${idx}::INT4"))
            }),
        );

        let count_sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM rooms \
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
            "SELECT {ROOM_COLUMNS} \
             FROM rooms \
             WHERE true {filtering} \
             ORDER BY number ASC \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
        );
        let items = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(room_from_row)
            .collect::<Vec<_>>();

        Ok(read::room::list::Page::new(arguments, items, total))
    }
}

impl<C>
    Database<
        Select<By<Vec<read::room::Occupant>, read::room::OccupantsSelector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::room::Occupant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::room::Occupant>, read::room::OccupantsSelector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use crate::domain::{Assignment, Payment, Student};

        let read::room::OccupantsSelector {
            room_id,
            include_inactive,
        } = by.into_inner();

        let sql = format!(
            "SELECT a.id AS assignment_id, a.room_id, a.student_id, \
                    a.check_in_at, a.check_out_at, a.is_active, \
                    s.user_id, s.name, s.college, \
                    s.created_at AS student_created_at, \
                    p.id AS payment_id, p.amount_due, p.amount_paid, \
                    p.remaining_amount, p.currency, p.status, p.method, \
                    p.paid_at, p.notes \
             FROM assignments AS a \
             JOIN students AS s ON s.id = a.student_id \
             LEFT JOIN payments AS p ON p.assignment_id = a.id \
             WHERE a.room_id = $1::UUID \
                   {active_filtering} \
             ORDER BY a.check_in_at DESC",
            active_filtering =
                if include_inactive { "" } else { "AND a.is_active" },
        );
        Ok(self
            .query(&sql, &[&room_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let assignment = Assignment {
                    id: row.get("assignment_id"),
                    room_id: row.get("room_id"),
                    student_id: row.get("student_id"),
                    check_in_at: row.get("check_in_at"),
                    check_out_at: row.get("check_out_at"),
                    is_active: row.get("is_active"),
                };
                let student = Student {
                    id: row.get("student_id"),
                    user_id: row.get("user_id"),
                    name: row.get("name"),
                    college: row.get("college"),
                    created_at: row.get("student_created_at"),
                };
                let payment = row
                    .get::<_, Option<crate::domain::payment::Id>>("payment_id")
                    .map(|id| {
                        let currency = row.get("currency");
                        Payment {
                            id,
                            assignment_id: assignment.id,
                            room_id: assignment.room_id,
                            student_id: assignment.student_id,
                            amount_due: Money {
                                amount: row.get("amount_due"),
                                currency,
                            },
                            amount_paid: Money {
                                amount: row.get("amount_paid"),
                                currency,
                            },
                            remaining_amount: Money {
                                amount: row.get("remaining_amount"),
                                currency,
                            },
                            status: row.get("status"),
                            method: row.get("method"),
                            paid_at: row.get("paid_at"),
                            notes: row.get("notes"),
                        }
                    });
                read::room::Occupant {
                    assignment,
                    student,
                    payment,
                }
            })
            .collect())
    }
}
