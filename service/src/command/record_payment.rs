//! [`Command`] for recording an additional payment on a [`Payment`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{payment, Payment},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording an additional payment on a [`Payment`].
///
/// Increments the paid amount and appends a timestamped note; the derived
/// remaining amount and status are recomputed in the same write.
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// ID of the [`Payment`] to record on.
    pub payment_id: payment::Id,

    /// Amount being paid; must be positive and in the [`Payment`]'s currency.
    pub amount: Money,

    /// New [`payment::Method`], if it changed.
    pub method: Option<payment::Method>,

    /// [`DateTime`] of the payment, defaulting to now.
    ///
    /// [`DateTime`]: common::DateTime
    pub paid_at: Option<payment::PaidDateTime>,

    /// Note to append to the [`Payment`]'s history.
    pub note: Option<payment::Notes>,
}

impl<Db> Command<RecordPayment> for Service<Db>
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
        cmd: RecordPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment {
            payment_id,
            amount,
            method,
            paid_at,
            note,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Payment>, _>::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(payment_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize concurrent increments of the same `Payment`.
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

        payment
            .add_paid(amount)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if let Some(method) = method {
            payment.method = method;
        }
        payment.paid_at = paid_at.unwrap_or_else(|| DateTime::now().coerce());
        if let Some(note) = note {
            payment.append_note(payment.paid_at, &note);
        }

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

/// Error of [`RecordPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Payment`] with the provided ID does not exist.
    #[display("`Payment(id: {_0})` does not exist")]
    PaymentNotExists(#[error(not(source))] payment::Id),

    /// The recorded amount is invalid.
    #[display("invalid payment amount: {_0}")]
    #[from]
    Record(payment::RecordError),
}
