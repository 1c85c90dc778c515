//! User accounts and the credential payloads that create or authenticate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rigshop_core::{DomainError, DomainResult, FieldViolation, UserId};

use crate::Role;

pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered account. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Stored lower-cased; unique.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Sign-in payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: `local@domain.tld`, no whitespace.
pub fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn check_email(email: &str, violations: &mut Vec<FieldViolation>) {
    if email.trim().is_empty() {
        violations.push(FieldViolation::new("email", "email should not be empty"));
    } else if !looks_like_email(email.trim()) {
        violations.push(FieldViolation::new("email", "email must be an email"));
    }
}

impl Registration {
    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        check_email(&self.email, &mut violations);
        if self.password.is_empty() {
            violations.push(FieldViolation::new("password", "password should not be empty"));
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            violations.push(FieldViolation::new(
                "password",
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        if self.name.trim().is_empty() {
            violations.push(FieldViolation::new("name", "name should not be empty"));
        }
        DomainError::check(violations)
    }

    /// Build the account record once the password has been hashed.
    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> DomainResult<User> {
        self.validate()?;
        Ok(User {
            id: UserId::new(),
            email: normalize_email(&self.email),
            password_hash,
            name: self.name.trim().to_string(),
            role: Role::default(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Credentials {
    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        check_email(&self.email, &mut violations);
        if self.password.is_empty() {
            violations.push(FieldViolation::new("password", "password should not be empty"));
        }
        DomainError::check(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, password: &str, name: &str) -> Registration {
        Registration {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("a@b.co"));
        assert!(looks_like_email("first.last@shop.example.com"));
        assert!(!looks_like_email("no-at-sign.com"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a b@c.d"));
        assert!(!looks_like_email("a@@b.co"));
    }

    #[test]
    fn registration_collects_every_violation() {
        let err = registration("nope", "123", " ").validate().unwrap_err();
        match err {
            DomainError::Validation(v) => {
                let fields: Vec<_> = v.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password", "name"]);
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn into_user_normalizes_email_and_defaults_role() {
        let user = registration("  Bob@Shop.COM ", "secret1", " Bob ")
            .into_user("hash".into(), Utc::now())
            .unwrap();
        assert_eq!(user.email, "bob@shop.com");
        assert_eq!(user.name, "Bob");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = registration("c@d.io", "secret1", "C")
            .into_user("$argon2id$secret".into(), Utc::now())
            .unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(Credentials { email: "a@b.co".into(), password: "".into() }.validate().is_err());
        assert!(Credentials { email: "a@b.co".into(), password: "x".into() }.validate().is_ok());
    }
}
