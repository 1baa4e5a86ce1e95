//! [`Payment`]-related handlers.
//!
//! [`Payment`]: service::domain::Payment

use axum::{
    extract::{Path, Query},
    Json,
};
use common::pagination;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::{
    command::{self, Command as _},
    domain::{payment, room, student},
    query, read, Query as _,
};

use crate::{
    api::dto::{self, PaginationDto, PaymentDto},
    define_error, ApiResponse, AsError, Auth, Error,
};

/// Query parameters of the payments list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// 1-based page number.
    pub page: Option<usize>,

    /// Page size.
    pub limit: Option<usize>,

    /// Payment status to filter by.
    pub status: Option<String>,

    /// Payment method to filter by.
    pub payment_method: Option<String>,

    /// Room to filter by.
    pub room_id: Option<Uuid>,

    /// Student to filter by.
    pub student_id: Option<Uuid>,

    /// Lower bound of the payment date.
    pub start_date: Option<String>,

    /// Upper bound of the payment date.
    pub end_date: Option<String>,
}

/// Payload of the payments list response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsPageDto {
    /// Payments on this page.
    pub payments: Vec<PaymentDto>,

    /// Pagination block.
    pub pagination: PaginationDto,
}

/// `GET /payments` handler (admin only).
///
/// # Errors
///
/// With a validation [`Error`] on malformed filters.
pub async fn list(
    auth: Auth,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<PaymentsPageDto>, Error> {
    auth.require_admin()?;

    let ListQuery {
        page,
        limit,
        status,
        payment_method,
        room_id,
        student_id,
        start_date,
        end_date,
    } = query;

    let from = start_date
        .map(|d| {
            common::DateTime::from_rfc3339(&d).map_err(|e| {
                Error::validation(format!("invalid `startDate`: {e}"))
            })
        })
        .transpose()?;
    let to = end_date
        .map(|d| {
            common::DateTime::from_rfc3339(&d).map_err(|e| {
                Error::validation(format!("invalid `endDate`: {e}"))
            })
        })
        .transpose()?;

    let filter = read::payment::list::Filter {
        status: status
            .as_deref()
            .map(dto::parse_payment_status)
            .transpose()?,
        method: payment_method
            .as_deref()
            .map(dto::parse_payment_method)
            .transpose()?,
        room_id: room_id.map(room::Id::from),
        student_id: student_id.map(student::Id::from),
        from,
        to,
    };
    let page = auth
        .service()
        .execute(query::payments::List::by(read::payment::list::Selector {
            arguments: pagination::Arguments::new(page, limit),
            filter,
        }))
        .await
        .map_err(AsError::into_error)?;

    let pagination = PaginationDto::of(&page);
    Ok(ApiResponse::ok(
        "Payments retrieved successfully",
        PaymentsPageDto {
            payments: page.items.into_iter().map(Into::into).collect(),
            pagination,
        },
    ))
}

/// Body of the payment edit endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    /// New due amount.
    pub amount_due: Option<String>,

    /// New paid amount.
    pub amount_paid: Option<String>,

    /// New payment method.
    pub payment_method: Option<String>,

    /// New payment date.
    pub payment_date: Option<String>,

    /// New notes (`null` clears them).
    #[serde(default, deserialize_with = "dto::double_option")]
    pub notes: Option<Option<String>>,
}

/// `PUT /payments/:id` handler (admin only).
///
/// # Errors
///
/// See [`PaymentError`] and the validation errors of the input fields.
pub async fn update(
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBody>,
) -> Result<ApiResponse<PaymentDto>, Error> {
    auth.require_admin()?;

    let UpdateBody {
        amount_due,
        amount_paid,
        payment_method,
        payment_date,
        notes,
    } = body;

    let amount_due =
        amount_due.as_deref().map(dto::parse_money).transpose()?;
    let amount_paid =
        amount_paid.as_deref().map(dto::parse_money).transpose()?;
    let method = payment_method
        .as_deref()
        .map(dto::parse_payment_method)
        .transpose()?;
    let paid_at = payment_date
        .map(|d| {
            common::DateTime::from_rfc3339(&d)
                .map(|dt| dt.coerce())
                .map_err(|e| {
                    Error::validation(format!("invalid `paymentDate`: {e}"))
                })
        })
        .transpose()?;
    let notes = notes
        .map(|n| {
            n.map(|n| {
                payment::Notes::new(n)
                    .ok_or_else(|| Error::validation("invalid `notes`"))
            })
            .transpose()
        })
        .transpose()?;

    let payment = auth
        .service()
        .execute(command::UpdatePayment {
            payment_id: payment::Id::from(id),
            amount_due,
            amount_paid,
            method,
            paid_at,
            notes,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Payment updated successfully",
        payment.into(),
    ))
}

/// Body of the additional payment endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBody {
    /// Amount being paid.
    pub amount: String,

    /// Method of this payment.
    pub payment_method: Option<String>,

    /// Date of this payment, defaulting to now.
    pub payment_date: Option<String>,

    /// Note to append to the payment history.
    pub notes: Option<String>,
}

/// `POST /payments/:id/add` handler (admin only).
///
/// # Errors
///
/// See [`PaymentError`] and the validation errors of the input fields.
pub async fn add(
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<AddBody>,
) -> Result<ApiResponse<PaymentDto>, Error> {
    auth.require_admin()?;

    let AddBody {
        amount,
        payment_method,
        payment_date,
        notes,
    } = body;

    let amount = dto::parse_money(&amount)?;
    let method = payment_method
        .as_deref()
        .map(dto::parse_payment_method)
        .transpose()?;
    let paid_at = payment_date
        .map(|d| {
            common::DateTime::from_rfc3339(&d)
                .map(|dt| dt.coerce())
                .map_err(|e| {
                    Error::validation(format!("invalid `paymentDate`: {e}"))
                })
        })
        .transpose()?;
    let note = notes
        .map(|n| {
            payment::Notes::new(n)
                .ok_or_else(|| Error::validation("invalid `notes`"))
        })
        .transpose()?;

    let payment = auth
        .service()
        .execute(command::RecordPayment {
            payment_id: payment::Id::from(id),
            amount,
            method,
            paid_at,
            note,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(ApiResponse::ok(
        "Payment recorded successfully",
        payment.into(),
    ))
}

impl AsError for command::record_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PaymentNotExists(_) => {
                Some(PaymentError::PaymentNotExists.into())
            }
            Self::Record(e) => Some(Error::validation(e)),
        }
    }
}

impl AsError for command::update_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::CurrencyMismatch { .. } => {
                Some(Error::validation("amounts must share one currency"))
            }
            Self::Db(e) => e.try_as_error(),
            Self::PaymentNotExists(_) => {
                Some(PaymentError::PaymentNotExists.into())
            }
        }
    }
}

define_error! {
    enum PaymentError {
        #[code = "PAYMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Payment` with the provided ID does not exist"]
        PaymentNotExists,
    }
}
