//! Account service: sign-up, sign-in and profile lookup.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use rigshop_auth::{
    Credentials, Hs256Tokens, PasswordError, Registration, TokenError, User, hash_password,
    user::normalize_email, verify_password,
};
use rigshop_core::{DomainError, UserId};

use crate::store::{StoreError, UserStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        AccountError::Store(StoreError::Domain(err))
    }
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<Hs256Tokens>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<Hs256Tokens>) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> Arc<Hs256Tokens> {
        self.tokens.clone()
    }

    #[instrument(skip(self, registration), err)]
    pub async fn register(&self, registration: Registration) -> Result<AccessToken, AccountError> {
        registration.validate()?;
        if self
            .users
            .find_by_email(&normalize_email(&registration.email))
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("email is already registered").into());
        }

        let password = registration.password.clone();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AccountError::Task(e.to_string()))??;

        let user = registration.into_user(hash, Utc::now())?;
        let user = self.users.insert(user).await?;
        info!(user_id = %user.id, "account registered");
        self.issue(&user)
    }

    #[instrument(skip(self, credentials), err)]
    pub async fn login(&self, credentials: Credentials) -> Result<AccessToken, AccountError> {
        credentials.validate()?;

        let Some(user) = self
            .users
            .find_by_email(&normalize_email(&credentials.email))
            .await?
        else {
            warn!("login rejected: unknown email");
            return Err(DomainError::Unauthorized.into());
        };

        let stored = user.password_hash.clone();
        let password = credentials.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AccountError::Task(e.to_string()))??;
        if !matches {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(DomainError::Unauthorized.into());
        }

        info!(user_id = %user.id, "login succeeded");
        self.issue(&user)
    }

    /// Current account for an authenticated subject.
    pub async fn profile(&self, id: &UserId) -> Result<User, AccountError> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized.into())
    }

    fn issue(&self, user: &User) -> Result<AccessToken, AccountError> {
        Ok(AccessToken {
            access_token: self.tokens.issue(user, Utc::now())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryUserStore;
    use rigshop_auth::TokenVerifier;

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(Hs256Tokens::new(b"test-secret", chrono::Duration::hours(1))),
        )
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: email.into(),
            password: password.into(),
            name: "Builder".into(),
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    fn is_domain(err: &AccountError, pred: impl Fn(&DomainError) -> bool) -> bool {
        matches!(err, AccountError::Store(StoreError::Domain(d)) if pred(d))
    }

    #[tokio::test]
    async fn register_then_login_issues_verifiable_tokens() {
        let svc = service();
        let signup = svc.register(registration("Gamer@Rig.io", "hunter22")).await.unwrap();
        let signin = svc.login(credentials("gamer@rig.io", "hunter22")).await.unwrap();

        let tokens = svc.tokens();
        let a = tokens.verify(&signup.access_token).unwrap();
        let b = tokens.verify(&signin.access_token).unwrap();
        assert_eq!(a.sub, b.sub);
        assert_eq!(b.email, "gamer@rig.io");

        let me = svc.profile(&b.sub).await.unwrap();
        assert_eq!(me.name, "Builder");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_unauthorized() {
        let svc = service();
        svc.register(registration("a@b.io", "correct-horse")).await.unwrap();

        let err = svc.login(credentials("a@b.io", "battery-staple")).await.unwrap_err();
        assert!(is_domain(&err, |d| matches!(d, DomainError::Unauthorized)));

        let err = svc.login(credentials("nobody@b.io", "whatever")).await.unwrap_err();
        assert!(is_domain(&err, |d| matches!(d, DomainError::Unauthorized)));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_case_insensitively() {
        let svc = service();
        svc.register(registration("dup@b.io", "secret1")).await.unwrap();
        let err = svc.register(registration("DUP@b.io", "secret2")).await.unwrap_err();
        assert!(is_domain(&err, |d| matches!(d, DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn short_password_is_a_validation_error() {
        let svc = service();
        let err = svc.register(registration("x@y.io", "123")).await.unwrap_err();
        assert!(is_domain(&err, |d| matches!(d, DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_subject_has_no_profile() {
        let svc = service();
        let err = svc.profile(&UserId::new()).await.unwrap_err();
        assert!(is_domain(&err, |d| matches!(d, DomainError::Unauthorized)));
    }
}
