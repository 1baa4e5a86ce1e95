//! [`Preference`]-related handlers.
//!
//! [`Preference`]: service::domain::Preference

use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use service::{
    command::{self, Command as _},
    domain::Preference,
    query, Query as _,
};

use crate::{
    api::dto::{self, PreferenceDto},
    ApiResponse, AsError, Auth, Error,
};

/// `GET /preferences` handler.
///
/// Returns an empty record when the user has declared nothing yet.
///
/// # Errors
///
/// With `AUTHORIZATION_REQUIRED` if the request carries no valid token.
pub async fn get_own(auth: Auth) -> Result<ApiResponse<PreferenceDto>, Error> {
    let preference = auth
        .service()
        .execute(query::preference::ByUserId::by(auth.user_id()))
        .await
        .map_err(AsError::into_error)?
        .unwrap_or_else(|| Preference::empty(auth.user_id()));

    Ok(ApiResponse::ok(
        "Preferences retrieved successfully",
        preference.into(),
    ))
}

/// Body of the preference update endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    /// New preferred room kind (`null` clears it).
    #[serde(default, deserialize_with = "dto::double_option")]
    pub room_type: Option<Option<String>>,

    /// New set of desired amenity IDs.
    pub amenity_ids: Option<Vec<Uuid>>,
}

/// `PUT /preferences` handler.
///
/// # Errors
///
/// With a validation [`Error`] on malformed fields, or `AMENITY_NOT_EXISTS`
/// on unknown amenities.
pub async fn update_own(
    auth: Auth,
    Json(body): Json<UpdateBody>,
) -> Result<ApiResponse<PreferenceDto>, Error> {
    let UpdateBody {
        room_type,
        amenity_ids,
    } = body;

    let room_kind = room_type
        .map(|k| {
            k.as_deref().map(dto::parse_room_kind).transpose()
        })
        .transpose()?;

    let preference = auth
        .service()
        .execute(command::UpdatePreferences {
            user_id: auth.user_id(),
            room_kind,
            amenities: amenity_ids
                .map(|ids| ids.into_iter().map(Into::into).collect()),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Preferences updated successfully",
        preference.into(),
    ))
}

impl AsError for command::update_preferences::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AmenityNotExists(_) => Some(Error {
                code: "AMENITY_NOT_EXISTS",
                status_code: http::StatusCode::NOT_FOUND,
                message: "`Amenity` with the provided ID does not exist"
                    .to_owned(),
                backtrace: None,
            }),
            Self::Db(e) => e.try_as_error(),
        }
    }
}
