//! [`Notification`]-related [`Database`] implementations.

use common::operations::Perform;
use tracerr::Traced;

use crate::{
    domain::{
        notification::{self, Notify, Target},
        user,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};
#[cfg(doc)]
use crate::domain::Notification;

impl<C> Database<Perform<Notify>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Perform(notify): Perform<Notify>,
    ) -> Result<Self::Ok, Self::Err> {
        let Notify {
            target,
            kind,
            title,
            message,
            related,
        } = notify;

        let related_id = related.map(|r| r.id);
        let related_kind = related.map(|r| r.kind);

        match target {
            Target::User(user_id) => {
                const SQL: &str = "\
                    INSERT INTO notifications (\
                        id, user_id, kind, title, message, \
                        related_id, related_kind, is_read, created_at \
                    ) VALUES (\
                        $1::UUID, $2::UUID, $3::INT2, $4::VARCHAR, $5::TEXT, \
                        $6::UUID, $7::INT2, false, NOW() \
                    )";
                self.exec(
                    SQL,
                    &[
                        &notification::Id::new(),
                        &user_id,
                        &kind,
                        &title,
                        &message,
                        &related_id,
                        &related_kind,
                    ],
                )
                .await
                .map_err(tracerr::wrap!())
                .map(drop)
            }
            Target::Admins => {
                // One row per active admin, IDs generated by the database.
                const SQL: &str = "\
                    INSERT INTO notifications (\
                        id, user_id, kind, title, message, \
                        related_id, related_kind, is_read, created_at \
                    ) \
                    SELECT gen_random_uuid(), id, $1::INT2, $2::VARCHAR, \
                           $3::TEXT, $4::UUID, $5::INT2, false, NOW() \
                    FROM users \
                    WHERE role = $6::INT2 \
                      AND is_active";
                self.exec(
                    SQL,
                    &[
                        &kind,
                        &title,
                        &message,
                        &related_id,
                        &related_kind,
                        &user::Role::Admin,
                    ],
                )
                .await
                .map_err(tracerr::wrap!())
                .map(drop)
            }
        }
    }
}
