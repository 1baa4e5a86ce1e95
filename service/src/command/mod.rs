//! [`Command`] definition.

pub mod accept_room_request;
pub mod assign_student;
pub mod authorize_user_session;
pub mod check_out_student;
pub mod create_room;
pub mod create_room_request;
pub mod create_user;
pub mod create_user_session;
pub mod delete_room;
pub mod record_payment;
pub mod reject_room_request;
pub mod update_payment;
pub mod update_preferences;
pub mod update_room;

use common::operations::Perform;
use tracerr::Traced;

use crate::{
    domain::notification::Notify,
    infra::{database, Database},
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_room_request::AcceptRoomRequest, assign_student::AssignStudent,
    authorize_user_session::AuthorizeUserSession,
    check_out_student::CheckOutStudent, create_room::CreateRoom,
    create_room_request::CreateRoomRequest, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_room::DeleteRoom,
    record_payment::RecordPayment, reject_room_request::RejectRoomRequest,
    update_payment::UpdatePayment, update_preferences::UpdatePreferences,
    update_room::UpdateRoom,
};

/// Delivers the provided [`Notify`] via the [`Database`], swallowing (but
/// logging) the failure.
///
/// Notification delivery is fire-and-forget: it happens after the workflow
/// has committed and must not fail it.
pub(crate) async fn notify<Db>(db: &Db, notification: Notify)
where
    Db: Database<Perform<Notify>, Ok = (), Err = Traced<database::Error>>,
{
    if let Err(e) = db.execute(Perform(notification)).await {
        tracing::warn!("failed to deliver notification: {e}");
    }
}
