//! REST API definitions.

pub mod auth;
pub mod dto;
pub mod payments;
pub mod preferences;
pub mod room_requests;
pub mod rooms;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::define_error;

/// Builds the [`Router`] of the whole REST API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/rooms", get(rooms::list).post(rooms::create))
        .route(
            "/rooms/:id",
            get(rooms::by_id).put(rooms::update).delete(rooms::delete),
        )
        .route("/rooms/assign", post(rooms::assign))
        .route("/rooms/checkout", post(rooms::checkout))
        .route("/rooms/:id/requests", get(room_requests::list_for_room))
        .route("/room-requests", post(room_requests::create))
        .route("/room-requests/my", get(room_requests::list_my))
        .route("/room-requests/matching", get(room_requests::matching))
        .route("/room-requests/:id/accept", put(room_requests::accept))
        .route("/room-requests/:id/reject", put(room_requests::reject))
        .route("/payments", get(payments::list))
        .route(
            "/payments/:id",
            put(payments::update),
        )
        .route("/payments/:id/add", post(payments::add))
        .route(
            "/preferences",
            get(preferences::get_own).put(preferences::update_own),
        )
}

define_error! {
    enum NotFoundError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Requested entity does not exist"]
        NotFound,
    }
}
