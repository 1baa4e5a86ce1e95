//! [`Payment`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{payment, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `payments` table selected for a [`Payment`].
const PAYMENT_COLUMNS: &str = "\
    id, assignment_id, room_id, student_id, \
    amount_due, amount_paid, remaining_amount, currency, \
    status, method, paid_at, notes";

/// Builds a [`Payment`] out of a [`Row`] selected with [`PAYMENT_COLUMNS`].
fn payment_from_row(row: &Row) -> Payment {
    let currency = row.get("currency");
    Payment {
        id: row.get("id"),
        assignment_id: row.get("assignment_id"),
        room_id: row.get("room_id"),
        student_id: row.get("student_id"),
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
}

impl<C> Database<Select<By<Option<Payment>, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} \
             FROM payments \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| payment_from_row(&row)))
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(payment)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            assignment_id,
            room_id,
            student_id,
            amount_due,
            amount_paid,
            remaining_amount,
            status,
            method,
            paid_at,
            notes,
        } = payment;

        let currency = amount_due.currency;
        let amount_due = amount_due.amount;
        let amount_paid = amount_paid.amount;
        let remaining_amount = remaining_amount.amount;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, assignment_id, room_id, student_id, \
                amount_due, amount_paid, remaining_amount, currency, \
                status, method, paid_at, notes \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::NUMERIC, $6::NUMERIC, $7::NUMERIC, $8::INT2, \
                $9::INT2, $10::INT2, $11::TIMESTAMPTZ, $12::TEXT \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET amount_due = EXCLUDED.amount_due, \
                amount_paid = EXCLUDED.amount_paid, \
                remaining_amount = EXCLUDED.remaining_amount, \
                currency = EXCLUDED.currency, \
                status = EXCLUDED.status, \
                method = EXCLUDED.method, \
                paid_at = EXCLUDED.paid_at, \
                notes = EXCLUDED.notes";
        self.exec(
            SQL,
            &[
                &id,
                &assignment_id,
                &room_id,
                &student_id,
                &amount_due,
                &amount_paid,
                &remaining_amount,
                &currency,
                &status,
                &method,
                &paid_at,
                &notes,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Payment, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Payment, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM payments \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::payment::list::Page, read::payment::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::payment::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::payment::list::Page, read::payment::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::payment::list::Selector {
            arguments,
            filter:
                read::payment::list::Filter {
                    status,
                    method,
                    room_id,
                    student_id,
                    from,
                    to,
                },
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let method_idx = method.as_ref().map(|m| {
            ps.push(m);
            ps.len()
        });
        let room_idx = room_id.as_ref().map(|r| {
            ps.push(r);
            ps.len()
        });
        let student_idx = student_id.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let from_idx = from.as_ref().map(|f| {
            ps.push(f);
            ps.len()
        });
        let to_idx = to.as_ref().map(|t| {
            ps.push(t);
            ps.len()
        });

        let filtering = format!(
            "{status} {method} {room} {student} {from} {to}",
            status = status_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND status = ${idx}::INT2"))
            }),
            method = method_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND method = ${idx}::INT2"))
            }),
            room = room_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND room_id = ${idx}::UUID"))
            }),
            student = student_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND student_id = ${idx}::UUID"))
            }),
            from = from_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND paid_at >= ${idx}::TIMESTAMPTZ"))
            }),
            to = to_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND paid_at <= ${idx}::TIMESTAMPTZ"))
            }),
        );

        let count_sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM payments \
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
            "SELECT {PAYMENT_COLUMNS} \
             FROM payments \
             WHERE true {filtering} \
             ORDER BY paid_at DESC \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
        );
        let items = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(payment_from_row)
            .collect::<Vec<_>>();

        Ok(read::payment::list::Page::new(arguments, items, total))
    }
}
