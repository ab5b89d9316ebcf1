//! Phone number value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

const MIN_NUMBER_LEN: usize = 10;
const MAX_NUMBER_LEN: usize = 15;
const PREFIX_LEN: usize = 3;

/// Validated phone number with an optional 3-character international prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    prefix: Option<String>,
    number: String,
}

impl PhoneNumber {
    /// Validates a phone number. An empty `prefix` means "no prefix".
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if `number` is shorter than 10 or longer than 15
    /// characters, or if a non-empty `prefix` is not exactly 3 characters.
    pub fn new(prefix: &str, number: &str) -> Result<Self, ValidationError> {
        let len = number.chars().count();
        if !(MIN_NUMBER_LEN..=MAX_NUMBER_LEN).contains(&len) {
            return Err(ValidationError::invalid_format(
                "phone_number",
                format!(
                    "number must be {}-{} characters, got {}",
                    MIN_NUMBER_LEN, MAX_NUMBER_LEN, len
                ),
            ));
        }

        let prefix = if prefix.is_empty() {
            None
        } else if prefix.chars().count() == PREFIX_LEN {
            Some(prefix.to_string())
        } else {
            return Err(ValidationError::invalid_format(
                "phone_prefix",
                format!("prefix must be exactly {} characters", PREFIX_LEN),
            ));
        };

        Ok(Self {
            prefix,
            number: number.to_string(),
        })
    }

    /// Validates a number without an international prefix.
    pub fn without_prefix(number: &str) -> Result<Self, ValidationError> {
        Self::new("", number)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn number(&self) -> &str {
        &self.number
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}{}", prefix, self.number),
            None => f.write_str(&self.number),
        }
    }
}
