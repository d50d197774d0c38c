//! Validated newtypes for the identifiers and profile values that cross the
//! identity provider / backend boundary.
//!
//! # Example
//!
//! ```ignore
//! use bloodconnect_models::value_types::{Email, PhoneNumber};
//!
//! let email: Email = "Donor@Example.com".parse().unwrap();
//! assert_eq!(email.as_str(), "donor@example.com");
//!
//! let phone: PhoneNumber = "+880 1712-345678".parse().unwrap();
//! assert_eq!(phone.digits_only(), "8801712345678");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::ValidateEmail;

/// Error type for value type parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueTypeError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),
}

// ============================================================================
// Email
// ============================================================================

/// A validated, case-normalized email address.
///
/// The email is the key of the backend user record, so two spellings that
/// differ only in case must map to the same value. Input is trimmed and
/// lowercased before validation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Email(String);

impl Email {
    /// Create a new Email from a string, normalizing and validating it.
    pub fn new(email: impl Into<String>) -> Result<Self, ValueTypeError> {
        let email = email.into().trim().to_lowercase();
        Self::validate(&email)?;
        Ok(Self(email))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Get the local part (before @) of the email.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    fn validate(email: &str) -> Result<(), ValueTypeError> {
        if email.is_empty() {
            return Err(ValueTypeError::InvalidEmail("email cannot be empty".into()));
        }

        if !email.validate_email() {
            return Err(ValueTypeError::InvalidEmail(format!(
                "'{}' is not a valid email address",
                email
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = ValueTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for Email {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Email {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Email {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// PhoneNumber
// ============================================================================

/// A validated phone number: optional leading `+`, digits, spaces, dashes and
/// parentheses, 7 to 15 digits.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 7;
    const MAX_DIGITS: usize = 15;

    pub fn new(phone: impl Into<String>) -> Result<Self, ValueTypeError> {
        let phone = phone.into();
        Self::validate(&phone)?;
        Ok(Self(phone))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digits_only(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    fn validate(phone: &str) -> Result<(), ValueTypeError> {
        if phone.is_empty() {
            return Err(ValueTypeError::InvalidPhoneNumber(
                "phone number cannot be empty".into(),
            ));
        }

        let valid_chars = phone.chars().all(|c| {
            c.is_ascii_digit() || c == '+' || c == '-' || c == '(' || c == ')' || c == ' '
        });
        if !valid_chars {
            return Err(ValueTypeError::InvalidPhoneNumber(format!(
                "'{}' contains invalid characters",
                phone
            )));
        }

        if phone.chars().skip(1).any(|c| c == '+') {
            return Err(ValueTypeError::InvalidPhoneNumber(
                "+ can only appear at the start".into(),
            ));
        }

        let digit_count = phone.chars().filter(|c| c.is_ascii_digit()).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digit_count) {
            return Err(ValueTypeError::InvalidPhoneNumber(format!(
                "phone number must have between {} and {} digits, got {}",
                Self::MIN_DIGITS,
                Self::MAX_DIGITS,
                digit_count
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhoneNumber({})", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
