//! Boat metadata attached to rentals of boat-carrying facility types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Insurance policy details as declared by the member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoatInsurance {
    pub provider_name: String,
    pub policy_number: String,
    pub expires_on: Option<NaiveDate>,
}

/// Whether the boat is insured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsuranceInfo {
    Insured(BoatInsurance),
    Uninsured,
}

impl InsuranceInfo {
    /// Depends only on the variant, not on the policy fields.
    pub fn has_insurance(&self) -> bool {
        matches!(self, InsuranceInfo::Insured(_))
    }

    pub fn policy(&self) -> Option<&BoatInsurance> {
        match self {
            InsuranceInfo::Insured(policy) => Some(policy),
            InsuranceInfo::Uninsured => None,
        }
    }
}

/// A member's boat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatInfo {
    name: String,
    length_meters: f64,
    width_meters: f64,
    insurance: InsuranceInfo,
}

impl BoatInfo {
    /// # Errors
    ///
    /// `EmptyField` for a blank name, `InvalidFormat` for non-positive or
    /// non-finite dimensions.
    pub fn new(
        name: impl Into<String>,
        length_meters: f64,
        width_meters: f64,
        insurance: InsuranceInfo,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("boat_name"));
        }
        check_dimension("length_meters", length_meters)?;
        check_dimension("width_meters", width_meters)?;

        Ok(Self {
            name,
            length_meters,
            width_meters,
            insurance,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length_meters(&self) -> f64 {
        self.length_meters
    }

    pub fn width_meters(&self) -> f64 {
        self.width_meters
    }

    pub fn insurance(&self) -> &InsuranceInfo {
        &self.insurance
    }

    pub fn has_insurance(&self) -> bool {
        self.insurance.has_insurance()
    }
}

fn check_dimension(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::invalid_format(
            field,
            format!("must be a positive number of meters, got {}", value),
        ))
    }
}
