//! Payment value attached to membership periods and rentals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Money, Timestamp};

/// Whether a payment has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Unpaid => write!(f, "UNPAID"),
        }
    }
}

/// How a payment was settled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    Other(String),
}

impl PaymentMethod {
    /// Parses a method name case-insensitively. Unknown names are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" => PaymentMethod::Cash,
            "bank_transfer" | "transfer" => PaymentMethod::BankTransfer,
            "card" | "credit_card" | "pos" => PaymentMethod::Card,
            _ => PaymentMethod::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment state of a membership period or rental.
///
/// Closed set of variants; consumers match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Payment {
    /// Settled payment.
    Paid {
        amount: Money,
        paid_at: Timestamp,
        method: PaymentMethod,
        currency: String,
        transaction_ref: Option<String>,
    },

    /// Amount still owed.
    Unpaid {
        amount_due: Money,
        due_date: Option<NaiveDate>,
    },
}

impl Payment {
    /// Creates an outstanding payment.
    pub fn unpaid(amount_due: Money, due_date: Option<NaiveDate>) -> Self {
        Payment::Unpaid {
            amount_due,
            due_date,
        }
    }

    pub fn status(&self) -> PaymentStatus {
        match self {
            Payment::Paid { .. } => PaymentStatus::Paid,
            Payment::Unpaid { .. } => PaymentStatus::Unpaid,
        }
    }

    /// Amount paid, or amount due when unpaid.
    pub fn amount(&self) -> Money {
        match self {
            Payment::Paid { amount, .. } => *amount,
            Payment::Unpaid { amount_due, .. } => *amount_due,
        }
    }

    /// When the payment was received. `None` while unpaid.
    pub fn paid_at(&self) -> Option<Timestamp> {
        match self {
            Payment::Paid { paid_at, .. } => Some(*paid_at),
            Payment::Unpaid { .. } => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, Payment::Paid { .. })
    }
}
