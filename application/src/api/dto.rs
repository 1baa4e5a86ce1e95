//! Data transfer objects of the REST API.

use std::str::FromStr as _;

use common::Money;
use serde::{Deserialize, Deserializer, Serialize};
use service::{
    domain::{
        assignment, payment, room, room_request, student, user, Assignment,
        Payment, Preference, Room, RoomRequest, Student, User,
    },
    read,
};

use crate::Error;

/// Pagination block of a list response.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    /// Total number of items across all pages.
    pub total: usize,

    /// 1-based number of this page.
    pub page: usize,

    /// Maximum number of items on a page.
    pub limit: usize,

    /// Total number of pages.
    pub total_pages: usize,
}

impl PaginationDto {
    /// Builds a [`PaginationDto`] out of a [`Page`].
    ///
    /// [`Page`]: common::pagination::Page
    pub fn of<I>(page: &common::pagination::Page<I>) -> Self {
        Self {
            total: page.total,
            page: page.arguments.page(),
            limit: page.arguments.limit(),
            total_pages: page.total_pages(),
        }
    }
}

/// [`Room`] representation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    /// ID of the room.
    pub id: room::Id,

    /// Human-readable room number.
    pub number: String,

    /// ID of the building the room is located in.
    pub building_id: Option<service::domain::building::Id>,

    /// Floor the room is located on.
    pub floor: Option<u16>,

    /// Kind of the room.
    pub room_type: String,

    /// Total number of beds.
    pub total_beds: u16,

    /// Number of free beds.
    pub available_beds: u16,

    /// Number of occupied beds.
    pub occupied_beds: u16,

    /// Current status of the room.
    pub status: String,

    /// Price of the whole room.
    pub room_price: Option<Money>,

    /// Price of a single bed.
    pub bed_price: Option<Money>,

    /// Description of the room.
    pub description: Option<String>,

    /// Photo URLs of the room.
    pub images: Vec<String>,

    /// IDs of amenities the room offers.
    pub amenity_ids: Vec<service::domain::amenity::Id>,

    /// When the room was created.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: room::CreationDateTime,
}

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            number: room.number.to_string(),
            building_id: room.building_id,
            floor: room.floor,
            room_type: room.kind.to_string(),
            total_beds: room.total_beds,
            available_beds: room.available_beds,
            occupied_beds: room.total_beds - room.available_beds,
            status: room.status.to_string(),
            room_price: room.room_price,
            bed_price: room.bed_price,
            description: room.description.map(|d| d.to_string()),
            images: room.images.iter().map(ToString::to_string).collect(),
            amenity_ids: room.amenities,
            created_at: room.created_at,
        }
    }
}

/// [`Student`] representation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    /// ID of the student.
    pub id: student::Id,

    /// ID of the backing user.
    pub user_id: user::Id,

    /// Display name of the student.
    pub name: String,

    /// College the student attends.
    pub college: Option<String>,
}

impl From<Student> for StudentDto {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            user_id: student.user_id,
            name: student.name.to_string(),
            college: student.college.map(|c| c.to_string()),
        }
    }
}

/// [`Assignment`] representation.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    /// ID of the assignment.
    pub id: assignment::Id,

    /// ID of the occupied room.
    pub room_id: room::Id,

    /// ID of the occupying student.
    pub student_id: student::Id,

    /// When the student checked in.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub check_in_date: assignment::CheckInDateTime,

    /// When the student checked out, if they did.
    #[serde(with = "common::datetime::serde::rfc3339::option")]
    pub check_out_date: Option<assignment::CheckOutDateTime>,

    /// Indicator whether the assignment is still active.
    pub is_active: bool,
}

impl From<Assignment> for AssignmentDto {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            room_id: assignment.room_id,
            student_id: assignment.student_id,
            check_in_date: assignment.check_in_at,
            check_out_date: assignment.check_out_at,
            is_active: assignment.is_active,
        }
    }
}

/// [`Payment`] representation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    /// ID of the payment.
    pub id: payment::Id,

    /// ID of the assignment the payment belongs to.
    pub assignment_id: assignment::Id,

    /// ID of the occupied room.
    pub room_id: room::Id,

    /// ID of the paying student.
    pub student_id: student::Id,

    /// Amount due.
    pub amount_due: Money,

    /// Amount paid so far.
    pub amount_paid: Money,

    /// Remaining amount.
    pub remaining_amount: Money,

    /// Derived status of the payment.
    pub status: String,

    /// Method of the latest payment.
    pub payment_method: String,

    /// Date of the latest payment.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub payment_date: payment::PaidDateTime,

    /// Accumulated notes.
    pub notes: Option<String>,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            assignment_id: payment.assignment_id,
            room_id: payment.room_id,
            student_id: payment.student_id,
            amount_due: payment.amount_due,
            amount_paid: payment.amount_paid,
            remaining_amount: payment.remaining_amount,
            status: payment.status.to_string(),
            payment_method: payment.method.to_string(),
            payment_date: payment.paid_at,
            notes: payment.notes.map(|n| n.to_string()),
        }
    }
}

/// [`RoomRequest`] representation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    /// ID of the request.
    pub id: room_request::Id,

    /// ID of the requested room.
    pub room_id: room::Id,

    /// ID of the requesting student.
    pub student_id: student::Id,

    /// Status of the request.
    pub status: String,

    /// Free-text notes of the request.
    pub notes: Option<String>,

    /// When the request was created.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: room_request::CreationDateTime,
}

impl From<RoomRequest> for RequestDto {
    fn from(request: RoomRequest) -> Self {
        Self {
            id: request.id,
            room_id: request.room_id,
            student_id: request.student_id,
            status: request.status.to_string(),
            notes: request.notes.map(|n| n.to_string()),
            created_at: request.created_at,
        }
    }
}

/// [`RoomRequest`] representation with its room and student attached.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetailsDto {
    /// The request itself.
    #[serde(flatten)]
    pub request: RequestDto,

    /// The requested room.
    pub room: RoomDto,

    /// The requesting student.
    pub student: StudentDto,
}

impl From<read::room_request::list::Node> for RequestDetailsDto {
    fn from(node: read::room_request::list::Node) -> Self {
        Self {
            request: node.request.into(),
            room: node.room.into(),
            student: node.student.into(),
        }
    }
}

/// [`User`] representation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// ID of the user.
    pub id: user::Id,

    /// Name of the user.
    pub name: String,

    /// Login of the user.
    pub login: String,

    /// Email of the user.
    pub email: Option<String>,

    /// Phone of the user.
    pub phone: Option<String>,

    /// Role of the user.
    pub role: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            login: user.login.to_string(),
            email: user.email.map(|e| e.to_string()),
            phone: user.phone.map(|p| p.to_string()),
            role: user.role.to_string(),
        }
    }
}

/// [`Preference`] representation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceDto {
    /// Preferred room kind.
    pub room_type: Option<String>,

    /// IDs of desired amenities.
    pub amenity_ids: Vec<service::domain::amenity::Id>,
}

impl From<Preference> for PreferenceDto {
    fn from(preference: Preference) -> Self {
        Self {
            room_type: preference.room_kind.map(|k| k.to_string()),
            amenity_ids: preference.amenities,
        }
    }
}

/// Parses a [`room::Kind`] out of its API representation.
///
/// # Errors
///
/// With a validation [`Error`] if the value is not a known kind.
pub fn parse_room_kind(value: &str) -> Result<room::Kind, Error> {
    room::Kind::from_str(value)
        .map_err(|_| Error::validation(format!("unknown room type `{value}`")))
}

/// Parses a [`room::Status`] out of its API representation.
///
/// # Errors
///
/// With a validation [`Error`] if the value is not a known status.
pub fn parse_room_status(value: &str) -> Result<room::Status, Error> {
    room::Status::from_str(value).map_err(|_| {
        Error::validation(format!("unknown room status `{value}`"))
    })
}

/// Parses a [`payment::Status`] out of its API representation.
///
/// # Errors
///
/// With a validation [`Error`] if the value is not a known status.
pub fn parse_payment_status(value: &str) -> Result<payment::Status, Error> {
    payment::Status::from_str(value).map_err(|_| {
        Error::validation(format!("unknown payment status `{value}`"))
    })
}

/// Parses a [`payment::Method`] out of its API representation.
///
/// # Errors
///
/// With a validation [`Error`] if the value is not a known method.
pub fn parse_payment_method(value: &str) -> Result<payment::Method, Error> {
    payment::Method::from_str(value).map_err(|_| {
        Error::validation(format!("unknown payment method `{value}`"))
    })
}

/// Parses a [`room_request::Status`] out of its API representation.
///
/// # Errors
///
/// With a validation [`Error`] if the value is not a known status.
pub fn parse_request_status(
    value: &str,
) -> Result<room_request::Status, Error> {
    room_request::Status::from_str(value).map_err(|_| {
        Error::validation(format!("unknown request status `{value}`"))
    })
}

/// Deserializes a `Option<Option<T>>` field distinguishing an absent value
/// (leave untouched) from an explicit `null` (clear).
///
/// # Errors
///
/// Propagates the inner deserialization error.
pub fn double_option<'de, T, D>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Parses a [`Money`] amount out of its API representation.
///
/// # Errors
///
/// With a validation [`Error`] if the value is malformed.
pub fn parse_money(value: &str) -> Result<Money, Error> {
    Money::from_str(value).map_err(|e| {
        Error::validation(format!("cannot parse money amount `{value}`: {e}"))
    })
}
