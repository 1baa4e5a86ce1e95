//! Authentication handlers.

use std::str::FromStr as _;

use axum::{Extension, Json};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{student, user},
};

use crate::{
    api::dto::UserDto, define_error, ApiResponse, AsError, Auth, Error,
    Service,
};

/// Body of the register endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    /// Name of the new user.
    pub name: String,

    /// Login of the new user.
    pub login: String,

    /// Password of the new user.
    pub password: String,

    /// Email of the new user.
    pub email: Option<String>,

    /// Phone of the new user.
    pub phone: Option<String>,

    /// Role of the new user, defaulting to student.
    pub role: Option<String>,

    /// College of the new student.
    pub college: Option<String>,
}

/// Body of the login endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Login of the user.
    pub login: String,

    /// Password of the user.
    pub password: String,
}

/// Payload of a successful register/login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    /// Bearer token of the created session.
    pub token: String,

    /// When the session expires.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub expires_at: user::session::ExpirationDateTime,

    /// The authenticated user.
    pub user: UserDto,
}

/// `POST /auth/register` handler.
///
/// # Errors
///
/// See [`RegisterError`] and the validation errors of the input fields.
pub async fn register(
    Extension(service): Extension<Service>,
    Json(body): Json<RegisterBody>,
) -> Result<ApiResponse<SessionDto>, Error> {
    let RegisterBody {
        name,
        login,
        password,
        email,
        phone,
        role,
        college,
    } = body;

    let name = user::Name::new(name)
        .ok_or_else(|| Error::validation("invalid `name`"))?;
    let login = user::Login::new(login)
        .ok_or_else(|| Error::validation("invalid `login`"))?;
    let password = user::Password::new(password)
        .ok_or_else(|| Error::validation("invalid `password`"))?;
    let email = email
        .map(|e| {
            user::Email::new(e)
                .ok_or_else(|| Error::validation("invalid `email`"))
        })
        .transpose()?;
    let phone = phone
        .map(|p| {
            user::Phone::new(p)
                .ok_or_else(|| Error::validation("invalid `phone`"))
        })
        .transpose()?;
    let role = match role.as_deref() {
        None => user::Role::Student,
        Some(role) => user::Role::from_str(role).map_err(|_| {
            Error::validation(format!("unknown role `{role}`"))
        })?,
    };
    let college = college
        .map(|c| {
            student::College::new(c)
                .ok_or_else(|| Error::validation("invalid `college`"))
        })
        .transpose()?;

    let output = service
        .execute(command::CreateUser {
            name,
            login,
            password: SecretBox::init_with(move || password),
            email,
            phone,
            role,
            college,
        })
        .await
        .map_err(AsError::into_error)?;

    let session = service
        .execute(command::CreateUserSession::ByUserId(output.user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::created(
        "Registered successfully",
        SessionDto {
            token: session.token.to_string(),
            expires_at: session.expires_at,
            user: session.user.into(),
        },
    ))
}

/// `POST /auth/login` handler.
///
/// # Errors
///
/// With `WRONG_CREDENTIALS` if the credentials match no user.
pub async fn login(
    Extension(service): Extension<Service>,
    Json(body): Json<LoginBody>,
) -> Result<ApiResponse<SessionDto>, Error> {
    let LoginBody { login, password } = body;

    let login = user::Login::new(login)
        .ok_or_else(|| Error::validation("invalid `login`"))?;
    let password = user::Password::new(password)
        .ok_or_else(|| Error::validation("invalid `password`"))?;

    let session = service
        .execute(command::CreateUserSession::ByCredentials {
            login,
            password: SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Logged in successfully",
        SessionDto {
            token: session.token.to_string(),
            expires_at: session.expires_at,
            user: session.user.into(),
        },
    ))
}

/// `GET /auth/me` handler.
///
/// # Errors
///
/// With `AUTHORIZATION_REQUIRED` if the request carries no valid token.
pub async fn me(auth: Auth) -> Result<ApiResponse<UserDto>, Error> {
    Ok(ApiResponse::ok("Authenticated", auth.user.into()))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LoginOccupied(_) => Some(RegisterError::LoginOccupied.into()),
            Self::NoContactInfo => Some(RegisterError::NoContactInfo.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) | Self::UserNotExists(_) => None,
            Self::WrongCredentials => {
                Some(LoginError::WrongCredentials.into())
            }
        }
    }
}

define_error! {
    enum RegisterError {
        #[code = "LOGIN_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Provided login is occupied by another user"]
        LoginOccupied,

        #[code = "NO_CONTACT_INFO"]
        #[status = BAD_REQUEST]
        #[message = "Either email or phone must be provided"]
        NoContactInfo,
    }
}

define_error! {
    enum LoginError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Provided credentials do not match any user"]
        WrongCredentials,
    }
}
