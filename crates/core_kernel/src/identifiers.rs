//! Strongly-typed identifiers for domain entities
//!
//! Aggregate identifiers have the form `PREFIX-XXXXXXXX`: a fixed prefix and
//! an 8 character alphanumeric suffix. They are compared case-insensitively
//! and stored upper-cased. Each concrete identifier is a thin newtype over
//! [`PrefixedId`], so validation lives in one place.

use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Length of the random part of every prefixed identifier
pub const ID_SUFFIX_LENGTH: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid organization ID format: {0}")]
    InvalidOrganizationId(String),

    #[error("Invalid tariff ID format: {0}")]
    InvalidTariffId(String),

    #[error("Invalid transaction ID format: {0}")]
    InvalidTransactionId(String),

    #[error("Invalid idempotency key format: {0}")]
    InvalidIdempotencyKey(String),
}

/// A validated `PREFIX-SUFFIX` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefixedId(String);

impl PrefixedId {
    /// Validates `raw` against the prefix and suffix length
    ///
    /// `error` builds the identifier-specific error on failure.
    pub fn parse(
        raw: &str,
        prefix: &str,
        suffix_length: usize,
        error: fn(String) -> IdError,
    ) -> Result<Self, IdError> {
        let mut parts = raw.split('-');
        let valid = match (parts.next(), parts.next(), parts.next()) {
            (Some(head), Some(suffix), None) => {
                head.eq_ignore_ascii_case(prefix)
                    && suffix.len() == suffix_length
                    && suffix.chars().all(|c| c.is_ascii_alphanumeric())
            }
            _ => false,
        };

        if !valid {
            return Err(error(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    /// Generates a fresh identifier with a random alphanumeric suffix
    pub fn generate(prefix: &str, suffix_length: usize) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(suffix_length)
            .map(char::from)
            .collect();
        Self(format!("{}-{}", prefix, suffix).to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the dash
    pub fn suffix(&self) -> &str {
        self.0.split_once('-').map(|(_, s)| s).unwrap_or_default()
    }
}

impl fmt::Display for PrefixedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! define_prefixed_id {
    ($name:ident, $prefix:literal, $error:path) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(PrefixedId);

        impl $name {
            /// Identifier prefix
            pub const PREFIX: &'static str = $prefix;

            /// Parses and normalises an identifier
            pub fn new(raw: &str) -> Result<Self, IdError> {
                PrefixedId::parse(raw, $prefix, ID_SUFFIX_LENGTH, $error).map(Self)
            }

            /// Creates a new random identifier
            pub fn generate() -> Self {
                Self(PrefixedId::generate($prefix, ID_SUFFIX_LENGTH))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0 .0
            }
        }
    };
}

define_prefixed_id!(OrganizationId, "ORG", IdError::InvalidOrganizationId);
define_prefixed_id!(TariffId, "TAR", IdError::InvalidTariffId);
define_prefixed_id!(TransactionId, "TR", IdError::InvalidTransactionId);

static IDEMPOTENCY_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-f0-9]{8}-[a-f0-9]{4}-4[a-f0-9]{3}-[89ab][a-f0-9]{3}-[a-f0-9]{12}$")
        .expect("idempotency key pattern is a valid regex")
});

/// Client-supplied key used to detect duplicate transaction requests
///
/// Must be a UUID v4 string. Input is accepted in any case and stored
/// lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new(raw: &str) -> Result<Self, IdError> {
        Self::validate_str(raw)?;
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Checks a raw string against the UUID v4 format, ignoring case
    pub fn validate_str(raw: &str) -> Result<(), IdError> {
        if IDEMPOTENCY_KEY_PATTERN.is_match(&raw.to_ascii_lowercase()) {
            Ok(())
        } else {
            Err(IdError::InvalidIdempotencyKey(raw.to_string()))
        }
    }

    /// Generates a fresh UUID v4 key
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Re-checks the stored value against the UUID v4 format
    pub fn validate(&self) -> Result<(), IdError> {
        Self::validate_str(&self.0)
    }

    /// Case-insensitive comparison
    pub fn equals(&self, other: &IdempotencyKey) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdempotencyKey {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<IdempotencyKey> for String {
    fn from(key: IdempotencyKey) -> String {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_id_is_upper_cased() {
        let id = OrganizationId::new("org-ab12cd34").unwrap();
        assert_eq!(id.as_str(), "ORG-AB12CD34");
        assert_eq!(id, OrganizationId::new("ORG-AB12cd34").unwrap());
    }

    #[test]
    fn test_wrong_prefix_is_rejected() {
        assert!(matches!(
            TariffId::new("ORG-AB12CD34"),
            Err(IdError::InvalidTariffId(_))
        ));
    }

    #[test]
    fn test_generated_id_parses_back() {
        let id = TransactionId::generate();
        assert!(id.as_str().starts_with("TR-"));
        assert_eq!(TransactionId::new(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_generated_idempotency_key_is_valid() {
        let key = IdempotencyKey::generate();
        assert!(key.validate().is_ok());
    }
}
