//! Club-wide settings

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::Money;
use crate::domain::membership::SUGGESTED_MEMBERSHIP_FEE;

#[derive(Debug, Clone, Deserialize)]
pub struct ClubConfig {
    /// Yearly membership fee in cents
    #[serde(default = "default_membership_fee_cents")]
    pub membership_fee_cents: i64,

    /// ISO 4217 code payments are recorded in
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl ClubConfig {
    pub fn membership_fee(&self) -> Money {
        Money::from_cents(self.membership_fee_cents)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.membership_fee_cents < 0 {
            return Err(ValidationError::NegativeMembershipFee);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency(self.currency.clone()));
        }
        Ok(())
    }
}

impl Default for ClubConfig {
    fn default() -> Self {
        Self {
            membership_fee_cents: default_membership_fee_cents(),
            currency: default_currency(),
        }
    }
}

fn default_membership_fee_cents() -> i64 {
    SUGGESTED_MEMBERSHIP_FEE.cents()
}

fn default_currency() -> String {
    "EUR".to_string()
}
