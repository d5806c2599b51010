//! Caller identity as seen by the use-case layer.
//!
//! Token signature checking happens upstream. By the time a request reaches
//! the services it carries verified claims; all the core needs from them is
//! the caller's external user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Anything that can name the authenticated caller.
pub trait IdentityClaims {
    fn external_user_id(&self) -> Result<&str, IdentityError>;
}

/// Claims extracted from an already verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaims {
    /// Subject claim: the auth provider's id for the caller.
    pub subject: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl VerifiedClaims {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            expires_at: None,
        }
    }
}

impl IdentityClaims for VerifiedClaims {
    fn external_user_id(&self) -> Result<&str, IdentityError> {
        if self.expires_at.is_some_and(|exp| exp <= Utc::now()) {
            return Err(IdentityError::Expired);
        }
        if self.subject.trim().is_empty() {
            return Err(IdentityError::MissingSubject);
        }
        Ok(&self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn subject_is_returned() {
        let claims = VerifiedClaims::new("auth0|123");
        assert_eq!(claims.external_user_id(), Ok("auth0|123"));
    }

    #[test]
    fn empty_subject_rejected() {
        assert_eq!(
            VerifiedClaims::new(" ").external_user_id(),
            Err(IdentityError::MissingSubject)
        );
    }

    #[test]
    fn expired_claims_rejected() {
        let claims = VerifiedClaims {
            subject: "auth0|123".into(),
            expires_at: Some(Utc::now() - Duration::seconds(1)),
        };
        assert_eq!(claims.external_user_id(), Err(IdentityError::Expired));
    }
}
