//! Application provides the REST API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Auth,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// Uniform JSON envelope wrapping every API response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Indicator whether the request succeeded.
    pub success: bool,

    /// Human-readable outcome description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Payload of a successful response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Machine-readable code of a failed response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<error::Code>,
}

impl<T> Envelope<T> {
    /// Creates a new successful [`Envelope`] with the provided payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    /// Creates a new failed [`Envelope`] with the provided code and message.
    pub fn failure(code: error::Code, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: Some(code),
        }
    }
}

/// Successful API response: an [`Envelope`] with an [`http::StatusCode`].
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// Status code of the response.
    pub status_code: http::StatusCode,

    /// Enveloped payload of the response.
    pub envelope: Envelope<T>,
}

impl<T> ApiResponse<T> {
    /// Creates a new `200 OK` [`ApiResponse`] with the provided payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: http::StatusCode::OK,
            envelope: Envelope::success(message, data),
        }
    }

    /// Creates a new `201 Created` [`ApiResponse`] with the provided payload.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: http::StatusCode::CREATED,
            envelope: Envelope::success(message, data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let Self {
            status_code,
            envelope,
        } = self;

        (status_code, Json(envelope)).into_response()
    }
}
