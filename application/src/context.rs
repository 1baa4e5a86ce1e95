//! Request identity context definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::{user, Student, User},
    query, Query as _,
};

use crate::{define_error, AsError, Error, Service};

/// Resolved identity of the current request: the authorized [`User`] behind
/// the bearer token.
#[derive(Debug)]
pub struct Auth {
    /// The authorized [`User`].
    pub user: User,

    /// [`Service`] instance the identity was resolved against.
    service: Service,
}

impl Auth {
    /// Returns [`Service`] instance of this [`Auth`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns ID of the authorized [`User`].
    #[must_use]
    pub fn user_id(&self) -> user::Id {
        self.user.id
    }

    /// Checks that the authorized [`User`] is an admin.
    ///
    /// # Errors
    ///
    /// With `NOT_ADMIN` if the [`User`] has any other role.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.user.role == user::Role::Admin {
            Ok(())
        } else {
            Err(PrivilegeError::Admin.into())
        }
    }

    /// Returns the [`Student`] record of the authorized [`User`].
    ///
    /// # Errors
    ///
    /// With `NOT_STUDENT` if the [`User`] is not a student or has no
    /// [`Student`] record.
    pub async fn require_student(&self) -> Result<Student, Error> {
        if self.user.role != user::Role::Student {
            return Err(PrivilegeError::Student.into());
        }
        self.service
            .execute(query::student::ByUserId::by(self.user.id))
            .await
            .map_err(AsError::into_error)?
            .ok_or_else(|| PrivilegeError::Student.into())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                Error::internal(&"missing `Service` extension")
            })?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AuthError::AuthorizationRequired.into()
                } else {
                    e.into_error()
                }
            })?;

        // SAFETY: The token arrived in a correct `Authorization` header.
        #[expect(unsafe_code, reason = "specified in correct header")]
        let token = unsafe {
            user::session::Token::new_unchecked(bearer.token().to_owned())
        };

        let output = service
            .execute(command::AuthorizeUserSession { token })
            .await
            .map_err(AsError::into_error)?;

        Ok(Self {
            user: output.user,
            service,
        })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
            Self::UserNotExists(_) => None,
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an admin"]
        Admin,

        #[code = "NOT_STUDENT"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a student"]
        Student,
    }
}
