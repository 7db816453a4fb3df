//! Request identity.
//!
//! Tokens are issued by the external identity service; the server binary
//! validates them and stores the decoded [`Claims`] in request extensions.
//! Handlers that need a role check call [`Claims::require_admin`] or
//! [`Claims::require_self_or_admin`] — this crate never decodes tokens
//! itself.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Role granted to an authenticated user.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

/// JWT claims payload, as issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Account email.
    pub email: String,
    /// Role: "student" or "admin".
    #[serde(default = "default_role")]
    pub role: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

fn default_role() -> String {
    ROLE_STUDENT.to_string()
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Require the admin role.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "admin role required".into(),
            ))
        }
    }

    /// Require that the caller is acting on their own account (matched by
    /// email) or holds the admin role. Case-insensitive on the email, since
    /// the identity service does not canonicalize it.
    pub fn require_self_or_admin(&self, email: &str) -> Result<(), ServiceError> {
        if self.is_admin() || self.email.eq_ignore_ascii_case(email) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "cannot access another student's records".into(),
            ))
        }
    }

    /// Same check, matched by user id instead of email.
    pub fn require_subject_or_admin(&self, sub: &str) -> Result<(), ServiceError> {
        if self.is_admin() || self.sub == sub {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "cannot access another student's records".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(email: &str, role: &str) -> Claims {
        Claims {
            sub: "u1".into(),
            email: email.into(),
            role: role.into(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn admin_checks() {
        assert!(claims("a@x.com", ROLE_ADMIN).require_admin().is_ok());
        assert!(claims("a@x.com", ROLE_STUDENT).require_admin().is_err());
    }

    #[test]
    fn self_or_admin() {
        let student = claims("me@x.com", ROLE_STUDENT);
        assert!(student.require_self_or_admin("me@x.com").is_ok());
        assert!(student.require_self_or_admin("ME@X.COM").is_ok());
        assert!(student.require_self_or_admin("other@x.com").is_err());

        let admin = claims("admin@x.com", ROLE_ADMIN);
        assert!(admin.require_self_or_admin("other@x.com").is_ok());
    }

    #[test]
    fn subject_or_admin() {
        let student = claims("me@x.com", ROLE_STUDENT);
        assert!(student.require_subject_or_admin("u1").is_ok());
        assert!(student.require_subject_or_admin("u2").is_err());
        assert!(claims("a@x.com", ROLE_ADMIN).require_subject_or_admin("u2").is_ok());
    }

    #[test]
    fn role_defaults_to_student() {
        let c: Claims =
            serde_json::from_str(r#"{"sub":"u1","email":"a@x.com","iat":0,"exp":1}"#).unwrap();
        assert_eq!(c.role, ROLE_STUDENT);
        assert!(!c.is_admin());
    }
}
