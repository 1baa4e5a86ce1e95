//! [`Room`]-related handlers.
//!
//! [`Room`]: service::domain::Room

use axum::{
    extract::{Path, Query},
    Json,
};
use common::pagination;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::{
    command::{self, Command as _},
    domain::{building, room, student},
    query, read, Query as _,
};

use crate::{
    api::dto::{
        self, AssignmentDto, PaginationDto, PaymentDto, RequestDetailsDto,
        RoomDto, StudentDto,
    },
    define_error, ApiResponse, AsError, Auth, Error,
};

/// Query parameters of the rooms list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// 1-based page number.
    pub page: Option<usize>,

    /// Page size.
    pub limit: Option<usize>,

    /// Room status to filter by.
    pub status: Option<String>,

    /// Room kind to filter by.
    pub room_type: Option<String>,

    /// Building to filter by.
    pub building_id: Option<Uuid>,

    /// Floor to filter by.
    pub floor: Option<u16>,
}

/// Payload of the rooms list response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsPageDto {
    /// Rooms on this page.
    pub rooms: Vec<RoomDto>,

    /// Pagination block.
    pub pagination: PaginationDto,
}

/// `GET /rooms` handler.
///
/// # Errors
///
/// With a validation [`Error`] on malformed filters.
pub async fn list(
    auth: Auth,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<RoomsPageDto>, Error> {
    let ListQuery {
        page,
        limit,
        status,
        room_type,
        building_id,
        floor,
    } = query;

    let filter = read::room::list::Filter {
        status: status.as_deref().map(dto::parse_room_status).transpose()?,
        kind: room_type.as_deref().map(dto::parse_room_kind).transpose()?,
        building_id: building_id.map(building::Id::from),
        floor,
    };
    let page = auth
        .service()
        .execute(query::rooms::List::by(read::room::list::Selector {
            arguments: pagination::Arguments::new(page, limit),
            filter,
        }))
        .await
        .map_err(AsError::into_error)?;

    let pagination = PaginationDto::of(&page);
    Ok(ApiResponse::ok(
        "Rooms retrieved successfully",
        RoomsPageDto {
            rooms: page.items.into_iter().map(Into::into).collect(),
            pagination,
        },
    ))
}

/// A room occupant in the room details response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantDto {
    /// The occupancy record.
    #[serde(flatten)]
    pub assignment: AssignmentDto,

    /// The occupying student.
    pub student: StudentDto,

    /// The payment of the stay, if one was opened.
    pub payment: Option<PaymentDto>,
}

impl From<read::room::Occupant> for OccupantDto {
    fn from(occupant: read::room::Occupant) -> Self {
        Self {
            assignment: occupant.assignment.into(),
            student: occupant.student.into(),
            payment: occupant.payment.map(Into::into),
        }
    }
}

/// Payload of the room details response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailsDto {
    /// The room itself.
    #[serde(flatten)]
    pub room: RoomDto,

    /// Current occupants of the room.
    pub occupants: Vec<OccupantDto>,

    /// Pending requests for the room.
    pub pending_requests: Vec<RequestDetailsDto>,
}

/// `GET /rooms/:id` handler.
///
/// # Errors
///
/// With `NOT_FOUND` if the room does not exist.
pub async fn by_id(
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<RoomDetailsDto>, Error> {
    let room_id = room::Id::from(id);

    let room = auth
        .service()
        .execute(query::room::ById::by(room_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(crate::api::NotFoundError::NotFound))?;

    let occupants = auth
        .service()
        .execute(query::room::Occupants::by(read::room::OccupantsSelector {
            room_id,
            include_inactive: false,
        }))
        .await
        .map_err(AsError::into_error)?;

    let pending = auth
        .service()
        .execute(query::room_requests::List::by(
            read::room_request::list::Selector {
                arguments: pagination::Arguments::new(
                    None,
                    Some(pagination::Arguments::MAX_LIMIT),
                ),
                filter: read::room_request::list::Filter {
                    room_id: Some(room_id),
                    student_id: None,
                    status: Some(
                        service::domain::room_request::Status::Pending,
                    ),
                },
            },
        ))
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Room retrieved successfully",
        RoomDetailsDto {
            room: room.into(),
            occupants: occupants.into_iter().map(Into::into).collect(),
            pending_requests: pending
                .items
                .into_iter()
                .map(Into::into)
                .collect(),
        },
    ))
}

/// Body of the room creation endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    /// Room number; auto-assigned when omitted.
    pub room_number: Option<String>,

    /// Building the room is located in.
    pub building_id: Option<Uuid>,

    /// Floor the room is located on.
    pub floor: Option<u16>,

    /// Kind of the room, defaulting to shared.
    pub room_type: Option<String>,

    /// Total number of beds.
    pub total_beds: u16,

    /// Price of the whole room.
    pub room_price: Option<String>,

    /// Price of a single bed.
    pub bed_price: Option<String>,

    /// Description of the room.
    pub description: Option<String>,

    /// Photo URLs of the room.
    pub images: Option<Vec<String>>,

    /// IDs of amenities the room offers.
    pub amenity_ids: Option<Vec<Uuid>>,
}

/// `POST /rooms` handler (admin only).
///
/// # Errors
///
/// See [`RoomError`] and the validation errors of the input fields.
pub async fn create(
    auth: Auth,
    Json(body): Json<CreateBody>,
) -> Result<ApiResponse<RoomDto>, Error> {
    auth.require_admin()?;

    let CreateBody {
        room_number,
        building_id,
        floor,
        room_type,
        total_beds,
        room_price,
        bed_price,
        description,
        images,
        amenity_ids,
    } = body;

    let number = room_number
        .map(|n| {
            room::Number::new(n)
                .ok_or_else(|| Error::validation("invalid `roomNumber`"))
        })
        .transpose()?;
    let kind = match room_type.as_deref() {
        None => room::Kind::Shared,
        Some(kind) => dto::parse_room_kind(kind)?,
    };
    let room_price =
        room_price.as_deref().map(dto::parse_money).transpose()?;
    let bed_price = bed_price.as_deref().map(dto::parse_money).transpose()?;
    let description = description
        .map(|d| {
            room::Description::new(d)
                .ok_or_else(|| Error::validation("invalid `description`"))
        })
        .transpose()?;
    let images = images
        .unwrap_or_default()
        .into_iter()
        .map(|url| {
            room::ImageUrl::new(url)
                .ok_or_else(|| Error::validation("invalid image URL"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let room = auth
        .service()
        .execute(command::CreateRoom {
            number,
            building_id: building_id.map(building::Id::from),
            floor,
            kind,
            total_beds,
            room_price,
            bed_price,
            description,
            images,
            amenities: amenity_ids
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::created("Room created successfully", room.into()))
}

/// Body of the room update endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    /// New room number.
    pub room_number: Option<String>,

    /// New building reference (`null` clears it).
    #[serde(default, deserialize_with = "dto::double_option")]
    pub building_id: Option<Option<Uuid>>,

    /// New floor (`null` clears it).
    #[serde(default, deserialize_with = "dto::double_option")]
    pub floor: Option<Option<u16>>,

    /// New kind of the room.
    pub room_type: Option<String>,

    /// New total number of beds.
    pub total_beds: Option<u16>,

    /// New price of the whole room (`null` clears it).
    #[serde(default, deserialize_with = "dto::double_option")]
    pub room_price: Option<Option<String>>,

    /// New price of a single bed (`null` clears it).
    #[serde(default, deserialize_with = "dto::double_option")]
    pub bed_price: Option<Option<String>>,

    /// New description (`null` clears it).
    #[serde(default, deserialize_with = "dto::double_option")]
    pub description: Option<Option<String>>,

    /// New photo URLs.
    pub images: Option<Vec<String>>,

    /// New set of amenity IDs.
    pub amenity_ids: Option<Vec<Uuid>>,

    /// Maintenance override toggle.
    pub maintenance: Option<bool>,
}

/// `PUT /rooms/:id` handler (admin only).
///
/// # Errors
///
/// See [`RoomError`] and the validation errors of the input fields.
pub async fn update(
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBody>,
) -> Result<ApiResponse<RoomDto>, Error> {
    auth.require_admin()?;

    let UpdateBody {
        room_number,
        building_id,
        floor,
        room_type,
        total_beds,
        room_price,
        bed_price,
        description,
        images,
        amenity_ids,
        maintenance,
    } = body;

    let number = room_number
        .map(|n| {
            room::Number::new(n)
                .ok_or_else(|| Error::validation("invalid `roomNumber`"))
        })
        .transpose()?;
    let kind = room_type.as_deref().map(dto::parse_room_kind).transpose()?;
    let room_price = room_price
        .map(|p| {
            p.as_deref().map(dto::parse_money).transpose()
        })
        .transpose()?;
    let bed_price = bed_price
        .map(|p| p.as_deref().map(dto::parse_money).transpose())
        .transpose()?;
    let description = description
        .map(|d| {
            d.map(|d| {
                room::Description::new(d).ok_or_else(|| {
                    Error::validation("invalid `description`")
                })
            })
            .transpose()
        })
        .transpose()?;
    let images = images
        .map(|images| {
            images
                .into_iter()
                .map(|url| {
                    room::ImageUrl::new(url).ok_or_else(|| {
                        Error::validation("invalid image URL")
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let room = auth
        .service()
        .execute(command::UpdateRoom {
            room_id: room::Id::from(id),
            number,
            building_id: building_id
                .map(|b| b.map(building::Id::from)),
            floor,
            kind,
            total_beds,
            room_price,
            bed_price,
            description,
            images,
            amenities: amenity_ids
                .map(|ids| ids.into_iter().map(Into::into).collect()),
            maintenance,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok("Room updated successfully", room.into()))
}

/// `DELETE /rooms/:id` handler (admin only).
///
/// # Errors
///
/// With `ROOM_OCCUPIED` while the room has active assignments.
pub async fn delete(
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<RoomDto>, Error> {
    auth.require_admin()?;

    let room = auth
        .service()
        .execute(command::DeleteRoom {
            room_id: room::Id::from(id),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok("Room deleted successfully", room.into()))
}

/// Body of the assignment endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    /// ID of the room to assign into.
    pub room_id: Uuid,

    /// ID of the student to assign.
    pub student_id: Uuid,

    /// Check-in date, defaulting to now.
    pub check_in_date: Option<String>,

    /// Due amount override for the opened payment.
    pub amount_due: Option<String>,

    /// Whether to close an existing assignment first.
    #[serde(default)]
    pub force_checkout: bool,
}

/// Payload of the assignment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetailsDto {
    /// The created assignment.
    #[serde(flatten)]
    pub assignment: AssignmentDto,

    /// The occupied room.
    pub room: RoomDto,

    /// The assigned student.
    pub student: StudentDto,

    /// The opened payment.
    pub payment: PaymentDto,
}

/// `POST /rooms/assign` handler (admin only).
///
/// # Errors
///
/// See [`RoomError`] and [`AssignError`].
pub async fn assign(
    auth: Auth,
    Json(body): Json<AssignBody>,
) -> Result<ApiResponse<AssignmentDetailsDto>, Error> {
    auth.require_admin()?;

    let AssignBody {
        room_id,
        student_id,
        check_in_date,
        amount_due,
        force_checkout,
    } = body;

    let check_in_at = check_in_date
        .map(|d| {
            common::DateTime::from_rfc3339(&d)
                .map(|dt| dt.coerce())
                .map_err(|e| {
                    Error::validation(format!("invalid `checkInDate`: {e}"))
                })
        })
        .transpose()?;
    let amount_due =
        amount_due.as_deref().map(dto::parse_money).transpose()?;

    let output = auth
        .service()
        .execute(command::AssignStudent {
            room_id: room::Id::from(room_id),
            student_id: student::Id::from(student_id),
            check_in_at,
            amount_due,
            force_checkout,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::created(
        "Student assigned to room successfully",
        AssignmentDetailsDto {
            assignment: output.assignment.into(),
            room: output.room.into(),
            student: output.student.into(),
            payment: output.payment.into(),
        },
    ))
}

/// Body of the checkout endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    /// ID of the student to check out.
    pub student_id: Uuid,

    /// Check-out date, defaulting to now.
    pub check_out_date: Option<String>,
}

/// Payload of the checkout response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDto {
    /// The closed assignment.
    #[serde(flatten)]
    pub assignment: AssignmentDto,

    /// The released room.
    pub room: RoomDto,
}

/// `POST /rooms/checkout` handler (admin only).
///
/// # Errors
///
/// See [`AssignError`].
pub async fn checkout(
    auth: Auth,
    Json(body): Json<CheckoutBody>,
) -> Result<ApiResponse<CheckoutDto>, Error> {
    auth.require_admin()?;

    let CheckoutBody {
        student_id,
        check_out_date,
    } = body;

    let check_out_at = check_out_date
        .map(|d| {
            common::DateTime::from_rfc3339(&d)
                .map(|dt| dt.coerce())
                .map_err(|e| {
                    Error::validation(format!("invalid `checkOutDate`: {e}"))
                })
        })
        .transpose()?;

    let output = auth
        .service()
        .execute(command::CheckOutStudent {
            student_id: student::Id::from(student_id),
            check_out_at,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Student checked out successfully",
        CheckoutDto {
            assignment: output.assignment.into(),
            room: output.room.into(),
        },
    ))
}

impl AsError for command::create_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AmenityNotExists(_) => Some(RoomError::AmenityNotExists.into()),
            Self::BuildingNotExists(_) => {
                Some(RoomError::BuildingNotExists.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::NumberOccupied(_) => Some(RoomError::NumberOccupied.into()),
            Self::Pricing(e) => Some(Error::validation(e)),
        }
    }
}

impl AsError for command::update_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AmenityNotExists(_) => Some(RoomError::AmenityNotExists.into()),
            Self::BedsBelowOccupancy { .. } => {
                Some(RoomError::BedsBelowOccupancy.into())
            }
            Self::BuildingNotExists(_) => {
                Some(RoomError::BuildingNotExists.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::NumberOccupied(_) => Some(RoomError::NumberOccupied.into()),
            Self::Pricing(e) => Some(Error::validation(e)),
            Self::RoomNotExists(_) => Some(RoomError::RoomNotExists.into()),
        }
    }
}

impl AsError for command::delete_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::RoomNotExists.into()),
            Self::RoomOccupied(_) => Some(RoomError::RoomOccupied.into()),
        }
    }
}

impl AsError for command::assign_student::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Capacity(_) | Self::RoomFull(_) => {
                Some(AssignError::RoomFull.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::RoomNotExists.into()),
            Self::RoomPriceUndefined(_) => {
                Some(RoomError::PriceUndefined.into())
            }
            Self::RoomUnderMaintenance(_) => {
                Some(AssignError::RoomUnderMaintenance.into())
            }
            Self::StudentAlreadyAssigned(_) => {
                Some(AssignError::StudentAlreadyAssigned.into())
            }
            Self::StudentNotExists(_) => {
                Some(AssignError::StudentNotExists.into())
            }
        }
    }
}

impl AsError for command::check_out_student::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Capacity(_) => None,
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::RoomNotExists.into()),
            Self::StudentNotAssigned(_) => {
                Some(AssignError::StudentNotAssigned.into())
            }
            Self::StudentNotExists(_) => {
                Some(AssignError::StudentNotExists.into())
            }
        }
    }
}

define_error! {
    enum RoomError {
        #[code = "AMENITY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Amenity` with the provided ID does not exist"]
        AmenityNotExists,

        #[code = "BEDS_BELOW_OCCUPANCY"]
        #[status = CONFLICT]
        #[message = "Cannot resize the room below its current occupancy"]
        BedsBelowOccupancy,

        #[code = "BUILDING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Building` with the provided ID does not exist"]
        BuildingNotExists,

        #[code = "ROOM_NUMBER_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Room number is already occupied"]
        NumberOccupied,

        #[code = "ROOM_PRICE_UNDEFINED"]
        #[status = BAD_REQUEST]
        #[message = "Room has no price defined for its kind"]
        PriceUndefined,

        #[code = "ROOM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Room` with the provided ID does not exist"]
        RoomNotExists,

        #[code = "ROOM_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Room has active assignments, check the students out \
                     first"]
        RoomOccupied,
    }
}

define_error! {
    enum AssignError {
        #[code = "ROOM_FULL"]
        #[status = CONFLICT]
        #[message = "Room has no available beds"]
        RoomFull,

        #[code = "ROOM_UNDER_MAINTENANCE"]
        #[status = CONFLICT]
        #[message = "Room is under maintenance, cannot assign students"]
        RoomUnderMaintenance,

        #[code = "STUDENT_ALREADY_ASSIGNED"]
        #[status = CONFLICT]
        #[message = "Student is already assigned to a room, check out first"]
        StudentAlreadyAssigned,

        #[code = "STUDENT_NOT_ASSIGNED"]
        #[status = NOT_FOUND]
        #[message = "Student is not assigned to any room"]
        StudentNotAssigned,

        #[code = "STUDENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Student` with the provided ID does not exist"]
        StudentNotExists,
    }
}
