//! [`Payment`] definitions.

use common::{define_kind, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use common::DateTime;

use crate::domain::{assignment, room, student};
#[cfg(doc)]
use crate::domain::{Assignment, Room, Student};

/// Payment ledger row of an [`Assignment`]: how much the occupying
/// [`Student`] owes and has paid for the bed.
///
/// Exactly one [`Payment`] exists per [`Assignment`]. The row outlives the
/// [`Assignment`]'s closure, forming the financial history.
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Assignment`] this [`Payment`] belongs to.
    pub assignment_id: assignment::Id,

    /// ID of the occupied [`Room`], for reporting.
    pub room_id: room::Id,

    /// ID of the paying [`Student`], for reporting.
    pub student_id: student::Id,

    /// Amount the [`Student`] is due.
    pub amount_due: Money,

    /// Amount the [`Student`] has paid so far.
    pub amount_paid: Money,

    /// `max(amount_due - amount_paid, 0)`, recomputed on every write.
    pub remaining_amount: Money,

    /// Derived [`Status`], recomputed on every write.
    pub status: Status,

    /// [`Method`] of the latest payment.
    pub method: Method,

    /// [`DateTime`] of the latest payment.
    pub paid_at: PaidDateTime,

    /// Accumulated timestamped [`Notes`], appended to rather than
    /// overwritten.
    pub notes: Option<Notes>,
}

impl Payment {
    /// Opens a new [`Payment`] for the provided [`Assignment`] with the given
    /// due amount and nothing paid yet.
    #[must_use]
    pub fn open(
        assignment: &assignment::Id,
        room_id: room::Id,
        student_id: student::Id,
        amount_due: Money,
        paid_at: PaidDateTime,
    ) -> Self {
        let amount_paid = Money::zero(amount_due.currency);
        let mut payment = Self {
            id: Id::new(),
            assignment_id: *assignment,
            room_id,
            student_id,
            amount_due,
            amount_paid,
            remaining_amount: amount_paid,
            status: Status::Unpaid,
            method: Method::Cash,
            paid_at,
            notes: None,
        };
        payment.recompute();
        payment
    }

    /// Adds the provided amount to [`amount_paid`] and recomputes the derived
    /// fields.
    ///
    /// # Errors
    ///
    /// - [`RecordError::NonPositiveAmount`] if `amount` is zero or negative;
    /// - [`RecordError::CurrencyMismatch`] if `amount` is in a different
    ///   [`Currency`] than this [`Payment`].
    ///
    /// [`amount_paid`]: Payment::amount_paid
    /// [`Currency`]: common::money::Currency
    pub fn add_paid(&mut self, amount: Money) -> Result<(), RecordError> {
        use RecordError as E;

        if !amount.is_positive() {
            return Err(E::NonPositiveAmount(amount));
        }
        if amount.currency != self.amount_due.currency {
            return Err(E::CurrencyMismatch {
                expected: self.amount_due.currency,
                provided: amount.currency,
            });
        }

        self.amount_paid.amount += amount.amount;
        self.recompute();

        Ok(())
    }

    /// Appends a timestamped note to [`notes`], keeping the prior ones.
    ///
    /// [`notes`]: Payment::notes
    pub fn append_note(&mut self, at: PaidDateTime, text: &Notes) {
        let entry = format!("{}: {text}", at.to_rfc3339());
        let combined = match self.notes.take() {
            Some(prior) => format!("{prior}\n{entry}"),
            None => entry,
        };
        // SAFETY: Concatenation of valid `Notes` with a timestamp prefix
        //         remains within the format.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let combined = unsafe { Notes::new_unchecked(combined) };
        self.notes = Some(combined);
    }

    /// Recomputes [`remaining_amount`] and [`status`] from the due/paid
    /// amounts.
    ///
    /// Derivation never lives anywhere else, so the stored values cannot
    /// drift from the amounts they are computed from.
    ///
    /// [`remaining_amount`]: Payment::remaining_amount
    /// [`status`]: Payment::status
    pub fn recompute(&mut self) {
        self.remaining_amount = Money {
            amount: (self.amount_due.amount - self.amount_paid.amount)
                .max(Decimal::ZERO),
            currency: self.amount_due.currency,
        };
        self.status = Status::derive(&self.amount_due, &self.amount_paid);
    }
}

/// ID of a [`Payment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Derived status of a [`Payment`]."]
    enum Status {
        #[doc = "Nothing has been paid yet."]
        Unpaid = 1,

        #[doc = "The due amount is fully covered."]
        Paid = 2,

        #[doc = "Something, but not everything, has been paid."]
        Partial = 3,
    }
}

impl Status {
    /// Derives a [`Status`] from the due/paid amounts.
    #[must_use]
    pub fn derive(due: &Money, paid: &Money) -> Self {
        if paid.amount <= Decimal::ZERO {
            Self::Unpaid
        } else if paid.amount >= due.amount {
            Self::Paid
        } else {
            Self::Partial
        }
    }
}

define_kind! {
    #[doc = "Method of a [`Payment`]."]
    enum Method {
        #[doc = "Cash payment."]
        Cash = 1,

        #[doc = "Card payment."]
        Card = 2,

        #[doc = "Bank transfer."]
        BankTransfer = 3,

        #[doc = "Any other method."]
        Other = 4,
    }
}

/// Accumulated notes of a [`Payment`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Notes(String);

impl Notes {
    /// Creates a new [`Notes`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `notes` match the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }

    /// Creates a new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        !notes.trim().is_empty() && notes.len() <= 8192
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// Error of recording an additional payment.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum RecordError {
    /// Additional amount is zero or negative.
    #[display("additional payment amount must be positive, got {_0}")]
    NonPositiveAmount(#[error(not(source))] Money),

    /// Additional amount is in a different currency than the [`Payment`].
    #[display("expected a {expected} amount, got {provided}")]
    CurrencyMismatch {
        /// [`Currency`] of the [`Payment`].
        ///
        /// [`Currency`]: common::money::Currency
        expected: common::money::Currency,

        /// [`Currency`] of the rejected amount.
        ///
        /// [`Currency`]: common::money::Currency
        provided: common::money::Currency,
    },
}

/// Marker type indicating a [`Payment`] being paid.
#[derive(Clone, Copy, Debug)]
pub struct Paid;

/// [`DateTime`] of the latest payment on a [`Payment`].
pub type PaidDateTime = DateTimeOf<(Payment, Paid)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{DateTime, Money};

    use super::{assignment, room, student, Payment, Status};

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn payment(due: &str) -> Payment {
        Payment::open(
            &assignment::Id::new(),
            room::Id::new(),
            student::Id::new(),
            money(due),
            DateTime::now().coerce(),
        )
    }

    #[test]
    fn opens_unpaid_with_full_remaining() {
        let payment = payment("150EGP");
        assert_eq!(payment.amount_paid, money("0EGP"));
        assert_eq!(payment.remaining_amount, money("150EGP"));
        assert_eq!(payment.status, Status::Unpaid);
    }

    #[test]
    fn partial_then_full_payment() {
        let mut payment = payment("150EGP");

        payment.add_paid(money("100EGP")).unwrap();
        assert_eq!(payment.amount_paid, money("100EGP"));
        assert_eq!(payment.remaining_amount, money("50EGP"));
        assert_eq!(payment.status, Status::Partial);

        payment.add_paid(money("50EGP")).unwrap();
        assert_eq!(payment.remaining_amount, money("0EGP"));
        assert_eq!(payment.status, Status::Paid);
    }

    #[test]
    fn overpayment_clamps_remaining() {
        let mut payment = payment("150EGP");
        payment.add_paid(money("200EGP")).unwrap();
        assert_eq!(payment.remaining_amount, money("0EGP"));
        assert_eq!(payment.status, Status::Paid);
    }

    #[test]
    fn rejects_non_positive_and_mismatched_amounts() {
        let mut payment = payment("150EGP");
        assert!(payment.add_paid(money("0EGP")).is_err());
        assert!(payment.add_paid(money("-10EGP")).is_err());
        assert!(payment.add_paid(money("10USD")).is_err());
        assert_eq!(payment.amount_paid, money("0EGP"));
        assert_eq!(payment.status, Status::Unpaid);
    }

    #[test]
    fn notes_accumulate() {
        let mut payment = payment("150EGP");
        let note = super::Notes::new("first installment").unwrap();
        payment.append_note(DateTime::now().coerce(), &note);
        let note = super::Notes::new("second installment").unwrap();
        payment.append_note(DateTime::now().coerce(), &note);

        let notes = payment.notes.unwrap();
        let notes: &str = notes.as_ref();
        assert!(notes.contains("first installment"));
        assert!(notes.contains("second installment"));
        assert_eq!(notes.lines().count(), 2);
    }
}
