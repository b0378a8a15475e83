//! Input validation for asset codes and idempotency keys
//!
//! Validated newtypes with private fields; the only way to obtain one is
//! through `new()` (or serde, which goes through the same check).

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Validation Errors
// ============================================================================

/// Validation errors for caller-supplied identifiers
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    #[error("Asset code must be uppercase: got '{got}', expected '{expected}'")]
    AssetNotUppercase { got: String, expected: String },

    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid format for {field}: '{value}' (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

// ============================================================================
// AssetCode - Validated Asset Code (Private Fields)
// ============================================================================

/// Validated asset code such as `GOLD` or `DIAMOND`
///
/// # Validation Rules
/// - Uppercase letters, digits and underscore only
/// - Length: 1-16 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetCode(String);

impl AssetCode {
    pub const MAX_LEN: usize = 16;

    /// Create a new validated AssetCode
    ///
    /// # Examples
    /// ```
    /// use wallet_ledger::account::validation::AssetCode;
    ///
    /// let gold = AssetCode::new("GOLD").unwrap();
    /// assert_eq!(gold.as_str(), "GOLD");
    ///
    /// assert!(AssetCode::new("gold").is_err()); // lowercase rejected
    /// ```
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();

        if code.is_empty() || code.len() > Self::MAX_LEN {
            return Err(ValidationError::InvalidLength {
                field: "asset",
                min: 1,
                max: Self::MAX_LEN,
                actual: code.len(),
            });
        }

        let expected = code.to_uppercase();
        if code != expected {
            return Err(ValidationError::AssetNotUppercase {
                got: code.to_string(),
                expected,
            });
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ValidationError::InvalidFormat {
                field: "asset",
                value: code.to_string(),
                expected: "uppercase letters, numbers, underscore only",
            });
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AssetCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AssetCode> for String {
    fn from(code: AssetCode) -> Self {
        code.0
    }
}

// ============================================================================
// ReferenceId - Caller-Supplied Idempotency Key
// ============================================================================

/// Idempotency key for one logical operation
///
/// At most one committed transaction exists per key. Any printable text is
/// accepted; only the length is constrained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceId(String);

impl ReferenceId {
    pub const MAX_LEN: usize = 128;

    pub fn new(reference: &str) -> Result<Self, ValidationError> {
        if reference.is_empty() || reference.len() > Self::MAX_LEN {
            return Err(ValidationError::InvalidLength {
                field: "reference_id",
                min: 1,
                max: Self::MAX_LEN,
                actual: reference.len(),
            });
        }

        if reference.chars().any(char::is_control) {
            return Err(ValidationError::InvalidFormat {
                field: "reference_id",
                value: reference.escape_default().to_string(),
                expected: "printable characters only",
            });
        }

        Ok(Self(reference.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ReferenceId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ReferenceId> for String {
    fn from(reference: ReferenceId) -> Self {
        reference.0
    }
}
