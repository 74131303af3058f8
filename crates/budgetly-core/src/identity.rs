//! Request identity resolved at the boundary

use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Who is making a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Identity {
    Authenticated { email: String },
    Anonymous,
}

impl Identity {
    /// Build from a raw header value; blank values are anonymous
    pub fn from_email(email: Option<&str>) -> Self {
        match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Self::Authenticated {
                email: email.to_string(),
            },
            None => Self::Anonymous,
        }
    }

    /// The owner email, or `MissingOwner` for anonymous requests
    pub fn email(&self) -> Result<&str> {
        match self {
            Self::Authenticated { email } => Ok(email),
            Self::Anonymous => Err(Error::MissingOwner),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn is_admin(&self, config: &AppConfig) -> bool {
        match self {
            Self::Authenticated { email } => config.is_admin(email),
            Self::Anonymous => false,
        }
    }
}
