//! Registered person and contact data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EmailAddress, PhoneNumber};
use crate::domain::foundation::UserId;

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// A person registered with the club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: EmailAddress,
    pub tax_code: String,
    pub addresses: Vec<Address>,
    pub phone_numbers: Vec<PhoneNumber>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// User data before persistence assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: EmailAddress,
    pub tax_code: String,
    pub addresses: Vec<Address>,
    pub phone_numbers: Vec<PhoneNumber>,
}

impl NewUser {
    /// Attaches the id assigned by persistence.
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            email: self.email,
            tax_code: self.tax_code,
            addresses: self.addresses,
            phone_numbers: self.phone_numbers,
        }
    }
}
