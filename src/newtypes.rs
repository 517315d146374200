use std::fmt;

use serde::Serialize;
use thiserror::Error;
use validator::ValidateEmail;

// ###########################################
// ################## EMAIL ##################
// ###########################################

/// Validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email format is invalid")]
    InvalidFormat,
}

impl Email {
    pub fn new(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if !trimmed.validate_email() {
            return Err(EmailError::InvalidFormat);
        }
        Ok(Email(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
