//! Validated input for recording a payment.

use serde::{Deserialize, Serialize};

use super::{Payment, PaymentMethod};
use crate::domain::foundation::{Money, Timestamp, ValidationError};

/// Details of a payment about to be recorded or corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    amount: Money,
    currency: String,
    method: PaymentMethod,
    transaction_ref: Option<String>,
}

impl PaymentDetails {
    /// Validates and normalizes payment details.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if the amount is not positive
    /// - `InvalidFormat` if the currency is not a 3-letter code
    pub fn new(
        amount: Money,
        currency: &str,
        method: PaymentMethod,
        transaction_ref: Option<String>,
    ) -> Result<Self, ValidationError> {
        if !amount.is_positive() {
            return Err(ValidationError::out_of_range(
                "amount",
                1,
                i64::MAX,
                amount.cents(),
            ));
        }

        let currency = currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a 3-letter ISO code",
            ));
        }

        let transaction_ref = transaction_ref
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(Self {
            amount,
            currency,
            method,
            transaction_ref,
        })
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    pub fn transaction_ref(&self) -> Option<&str> {
        self.transaction_ref.as_deref()
    }

    /// The settled payment these details describe, received at `paid_at`.
    pub fn into_paid(self, paid_at: Timestamp) -> Payment {
        Payment::Paid {
            amount: self.amount,
            paid_at,
            method: self.method,
            currency: self.currency,
            transaction_ref: self.transaction_ref,
        }
    }
}
