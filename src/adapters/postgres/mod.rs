//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresMemberRepository` - users, contacts and membership periods
//! - `PostgresFacilityRepository` - catalog, pricing rules, transactional rent/free
//! - `PostgresWaitingListRepository` - per-facility-type queues
//! - `PostgresPaymentRepository` - one payment per membership period or rental
//! - `PostgresSeasonRepository` - season lookup
//!
//! Schema lives in `migrations/`. Money columns hold integer cents.

mod facility_repository;
mod member_repository;
mod payment_repository;
mod season_repository;
mod waiting_list_repository;

pub use facility_repository::PostgresFacilityRepository;
pub use member_repository::PostgresMemberRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use season_repository::PostgresSeasonRepository;
pub use waiting_list_repository::PostgresWaitingListRepository;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::foundation::{DomainError, Money, Timestamp};
use crate::domain::payment::{Payment, PaymentMethod};

/// Wraps a driver error as an opaque persistence failure.
pub(crate) fn database_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::database(format!("Failed to {}: {}", action, e))
}

/// True if `err` is a violation of the named constraint or unique index.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

/// Select list matching [`PaymentColumns`] for a `LEFT JOIN payments p`.
pub(crate) const PAYMENT_SELECT: &str = "p.amount_cents AS payment_amount_cents, \
     p.currency AS payment_currency, \
     p.method AS payment_method, \
     p.transaction_ref AS payment_transaction_ref, \
     p.paid_at AS payment_paid_at";

/// Payment columns of a `LEFT JOIN payments p`, all null when unpaid.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub(crate) struct PaymentColumns {
    payment_amount_cents: Option<i64>,
    payment_currency: Option<String>,
    payment_method: Option<String>,
    payment_transaction_ref: Option<String>,
    payment_paid_at: Option<DateTime<Utc>>,
}

impl PaymentColumns {
    /// The recorded payment, or an outstanding one for `amount_due`.
    pub(crate) fn into_payment(self, amount_due: Money, due_date: Option<NaiveDate>) -> Payment {
        match (self.payment_amount_cents, self.payment_paid_at) {
            (Some(cents), Some(paid_at)) => Payment::Paid {
                amount: Money::from_cents(cents),
                paid_at: Timestamp::from_datetime(paid_at),
                method: PaymentMethod::parse(self.payment_method.as_deref().unwrap_or_default()),
                currency: self.payment_currency.unwrap_or_default(),
                transaction_ref: self.payment_transaction_ref,
            },
            _ => Payment::unpaid(amount_due, due_date),
        }
    }
}
