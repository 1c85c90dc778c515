use rigshop_auth::SessionClaims;
use rigshop_core::UserId;

/// Authenticated caller, derived from a verified session token.
///
/// Only the subject is carried; the profile itself is reloaded from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
}

impl PrincipalContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl From<SessionClaims> for PrincipalContext {
    fn from(claims: SessionClaims) -> Self {
        Self::new(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rigshop_auth::Role;

    use super::*;

    #[test]
    fn principal_takes_the_token_subject() {
        let user_id = UserId::new();
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            email: "ada@example.com".into(),
            role: Role::User,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        assert_eq!(PrincipalContext::from(claims).user_id(), user_id);
    }
}
