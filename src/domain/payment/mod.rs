//! Payment domain module.
//!
//! Payments are attached to membership periods and rented facilities.
//!
//! # Module Structure
//!
//! - `payment` - Paid / Unpaid payment value and payment methods
//! - `details` - Validated input for recording a payment
//! - `errors` - PaymentError

mod details;
mod errors;
mod payment;

pub use details::PaymentDetails;
pub use errors::PaymentError;
pub use payment::{Payment, PaymentMethod, PaymentStatus};
