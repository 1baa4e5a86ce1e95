//! [`RoomRequest`]-related handlers.
//!
//! [`RoomRequest`]: service::domain::RoomRequest

use axum::{
    extract::{Path, Query},
    Json,
};
use common::pagination;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::{
    command::{self, Command as _},
    domain::{room, room_request},
    query, read, Query as _,
};

use crate::{
    api::dto::{
        self, AssignmentDto, PaginationDto, PaymentDto, RequestDetailsDto,
        RequestDto, RoomDto, StudentDto,
    },
    define_error, ApiResponse, AsError, Auth, Error,
};

/// Body of the request creation endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    /// ID of the requested room.
    pub room_id: Uuid,

    /// Free-text notes accompanying the request.
    pub notes: Option<String>,
}

/// Payload of the request creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRequestDto {
    /// The created request.
    #[serde(flatten)]
    pub request: RequestDto,

    /// The requested room.
    pub room: RoomDto,

    /// The requesting student.
    pub student: StudentDto,
}

/// `POST /room-requests` handler (student only).
///
/// # Errors
///
/// See [`RequestError`].
pub async fn create(
    auth: Auth,
    Json(body): Json<CreateBody>,
) -> Result<ApiResponse<CreatedRequestDto>, Error> {
    let student = auth.require_student().await?;

    let CreateBody { room_id, notes } = body;

    let notes = notes
        .map(|n| {
            room_request::Notes::new(n)
                .ok_or_else(|| Error::validation("invalid `notes`"))
        })
        .transpose()?;

    let output = auth
        .service()
        .execute(command::CreateRoomRequest {
            student_id: student.id,
            room_id: room::Id::from(room_id),
            notes,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::created(
        "Room request created successfully",
        CreatedRequestDto {
            request: output.request.into(),
            room: output.room.into(),
            student: output.student.into(),
        },
    ))
}

/// Query parameters of the request list endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// 1-based page number.
    pub page: Option<usize>,

    /// Page size.
    pub limit: Option<usize>,

    /// Request status to filter by.
    pub status: Option<String>,
}

/// Payload of a request list response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestsPageDto {
    /// Requests on this page.
    pub requests: Vec<RequestDetailsDto>,

    /// Pagination block.
    pub pagination: PaginationDto,
}

/// `GET /room-requests/my` handler (student only).
///
/// # Errors
///
/// With a validation [`Error`] on malformed filters.
pub async fn list_my(
    auth: Auth,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<RequestsPageDto>, Error> {
    let student = auth.require_student().await?;

    let ListQuery {
        page,
        limit,
        status,
    } = query;

    let page = auth
        .service()
        .execute(query::room_requests::List::by(
            read::room_request::list::Selector {
                arguments: pagination::Arguments::new(page, limit),
                filter: read::room_request::list::Filter {
                    room_id: None,
                    student_id: Some(student.id),
                    status: status
                        .as_deref()
                        .map(dto::parse_request_status)
                        .transpose()?,
                },
            },
        ))
        .await
        .map_err(AsError::into_error)?;

    let pagination = PaginationDto::of(&page);
    Ok(ApiResponse::ok(
        "Room requests retrieved successfully",
        RequestsPageDto {
            requests: page.items.into_iter().map(Into::into).collect(),
            pagination,
        },
    ))
}

/// `GET /rooms/:id/requests` handler (admin only).
///
/// # Errors
///
/// With a validation [`Error`] on malformed filters.
pub async fn list_for_room(
    auth: Auth,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<RequestsPageDto>, Error> {
    auth.require_admin()?;

    let ListQuery {
        page,
        limit,
        status,
    } = query;

    let page = auth
        .service()
        .execute(query::room_requests::List::by(
            read::room_request::list::Selector {
                arguments: pagination::Arguments::new(page, limit),
                filter: read::room_request::list::Filter {
                    room_id: Some(room::Id::from(id)),
                    student_id: None,
                    status: status
                        .as_deref()
                        .map(dto::parse_request_status)
                        .transpose()?,
                },
            },
        ))
        .await
        .map_err(AsError::into_error)?;

    let pagination = PaginationDto::of(&page);
    Ok(ApiResponse::ok(
        "Room requests retrieved successfully",
        RequestsPageDto {
            requests: page.items.into_iter().map(Into::into).collect(),
            pagination,
        },
    ))
}

/// A room matched against the student's preferences.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRoomDto {
    /// The matched room.
    #[serde(flatten)]
    pub room: RoomDto,

    /// Status of the student's request for this room, if any.
    pub request_status: Option<String>,

    /// Indicator whether the student has a pending request for this room.
    pub has_pending_request: bool,
}

/// `GET /room-requests/matching` handler (student only).
///
/// # Errors
///
/// With `NOT_STUDENT` for non-student callers.
pub async fn matching(
    auth: Auth,
) -> Result<ApiResponse<Vec<MatchedRoomDto>>, Error> {
    let student = auth.require_student().await?;

    let matches = auth
        .service()
        .execute(query::MatchingRooms {
            student_id: student.id,
            user_id: auth.user_id(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Matching rooms retrieved successfully",
        matches
            .into_iter()
            .map(|m| MatchedRoomDto {
                room: m.room.into(),
                has_pending_request: m.request_status
                    == Some(room_request::Status::Pending),
                request_status: m.request_status.map(|s| s.to_string()),
            })
            .collect(),
    ))
}

/// Payload of the request acceptance response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedRequestDto {
    /// The accepted request.
    #[serde(flatten)]
    pub request: RequestDto,

    /// The created assignment.
    pub assignment: AssignmentDto,

    /// The occupied room.
    pub room: RoomDto,

    /// The opened payment.
    pub payment: PaymentDto,
}

/// `PUT /room-requests/:id/accept` handler (admin only).
///
/// # Errors
///
/// See [`RequestError`].
pub async fn accept(
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<AcceptedRequestDto>, Error> {
    auth.require_admin()?;

    let output = auth
        .service()
        .execute(command::AcceptRoomRequest {
            request_id: room_request::Id::from(id),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Room request accepted successfully",
        AcceptedRequestDto {
            request: output.request.into(),
            assignment: output.assignment.into(),
            room: output.room.into(),
            payment: output.payment.into(),
        },
    ))
}

/// `PUT /room-requests/:id/reject` handler (admin only).
///
/// # Errors
///
/// See [`RequestError`].
pub async fn reject(
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<RequestDto>, Error> {
    auth.require_admin()?;

    let request = auth
        .service()
        .execute(command::RejectRoomRequest {
            request_id: room_request::Id::from(id),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Room request rejected successfully",
        request.into(),
    ))
}

impl AsError for command::create_room_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AlreadyAssigned(_) => {
                Some(RequestError::AlreadyAssigned.into())
            }
            Self::AlreadyRequested(_) => {
                Some(RequestError::AlreadyRequested.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::RoomFull(_) => Some(RequestError::RoomFull.into()),
            Self::RoomNotExists(_) => Some(RequestError::RoomNotExists.into()),
            Self::StudentNotExists(_) => None,
        }
    }
}

impl AsError for command::accept_room_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Capacity(_) | Self::RoomFull(_) => {
                Some(RequestError::RoomFull.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::RequestNotExists(_) => {
                Some(RequestError::RequestNotExists.into())
            }
            Self::RequestNotPending(_) => {
                Some(RequestError::RequestNotPending.into())
            }
            Self::RoomNotExists(_) => Some(RequestError::RoomNotExists.into()),
            Self::RoomPriceUndefined(_) | Self::StudentNotExists(_) => None,
        }
    }
}

impl AsError for command::reject_room_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RequestNotExists(_) => {
                Some(RequestError::RequestNotExists.into())
            }
            Self::RequestNotPending(_) => {
                Some(RequestError::RequestNotPending.into())
            }
            Self::RoomNotExists(_) | Self::StudentNotExists(_) => None,
        }
    }
}

define_error! {
    enum RequestError {
        #[code = "ALREADY_ASSIGNED"]
        #[status = CONFLICT]
        #[message = "Student is already assigned to this room"]
        AlreadyAssigned,

        #[code = "ALREADY_REQUESTED"]
        #[status = CONFLICT]
        #[message = "A pending request for this room already exists"]
        AlreadyRequested,

        #[code = "REQUEST_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`RoomRequest` with the provided ID does not exist"]
        RequestNotExists,

        #[code = "REQUEST_NOT_PENDING"]
        #[status = CONFLICT]
        #[message = "`RoomRequest` is not pending"]
        RequestNotPending,

        #[code = "ROOM_FULL"]
        #[status = CONFLICT]
        #[message = "Room has no available beds"]
        RoomFull,

        #[code = "ROOM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Room` with the provided ID does not exist"]
        RoomNotExists,
    }
}
