//! [`Command`] for directly editing a [`Payment`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{payment, Payment},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for directly overwriting fields of a [`Payment`] by an admin.
///
/// Absent fields are left untouched; the derived remaining amount and status
/// are recomputed in the same write.
#[derive(Clone, Debug, Default)]
pub struct UpdatePayment {
    /// ID of the [`Payment`] to edit.
    pub payment_id: payment::Id,

    /// New due amount.
    pub amount_due: Option<Money>,

    /// New paid amount.
    pub amount_paid: Option<Money>,

    /// New [`payment::Method`].
    pub method: Option<payment::Method>,

    /// New payment [`DateTime`].
    ///
    /// [`DateTime`]: common::DateTime
    pub paid_at: Option<payment::PaidDateTime>,

    /// New notes (`Some(None)` clears them).
    pub notes: Option<Option<payment::Notes>>,
}

impl<Db> Command<UpdatePayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Payment>, payment::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Payment, payment::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Payment>, payment::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<Update<Payment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdatePayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdatePayment {
            payment_id,
            amount_due,
            amount_paid,
            method,
            paid_at,
            notes,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut payment = tx
            .execute(Select(By::<Option<Payment>, _>::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(payment_id))
            .map_err(tracerr::wrap!())?;

        if let Some(amount_due) = amount_due {
            payment.amount_due = amount_due;
        }
        if let Some(amount_paid) = amount_paid {
            if amount_paid.currency != payment.amount_due.currency {
                return Err(tracerr::new!(E::CurrencyMismatch {
                    expected: payment.amount_due.currency,
                    provided: amount_paid.currency,
                }));
            }
            payment.amount_paid = amount_paid;
        }
        if let Some(method) = method {
            payment.method = method;
        }
        if let Some(paid_at) = paid_at {
            payment.paid_at = paid_at;
        }
        if let Some(notes) = notes {
            payment.notes = notes;
        }
        payment.recompute();

        tx.execute(Update(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(payment)
    }
}

/// Error of [`UpdatePayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Paid amount is in a different currency than the due amount.
    #[display("expected a {expected} amount, got {provided}")]
    CurrencyMismatch {
        /// [`Currency`] of the due amount.
        ///
        /// [`Currency`]: common::money::Currency
        expected: common::money::Currency,

        /// [`Currency`] of the rejected amount.
        ///
        /// [`Currency`]: common::money::Currency
        provided: common::money::Currency,
    },

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Payment`] with the provided ID does not exist.
    #[display("`Payment(id: {_0})` does not exist")]
    PaymentNotExists(#[error(not(source))] payment::Id),
}
