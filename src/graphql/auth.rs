//! GraphQL authentication
//!
//! Token issuing/verification and the per-request user context. The
//! transport layer resolves the bearer token once per request (the auth
//! gate in `main.rs`) and inserts a [`CurrentUser`] into the request
//! data; protected mutations read it back through [`AuthExt`].

use async_graphql::{Context, ErrorExtensions, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::db::UserRecord;

/// Claims carried in a login token.
///
/// No expiry claim is set, matching the issued-token contract: a token
/// stays valid until the signing secret rotates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID (subject)
    pub sub: String,
    /// Username at the time of login
    pub username: String,
}

/// The request's resolved user, loaded from the database by the auth gate
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

/// Authentication errors surfaced through GraphQL
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A protected mutation ran with no valid current user in context
    #[error("failed authentication")]
    Unauthenticated,

    /// Login with an unknown username or a wrong password. The two
    /// cases are deliberately indistinguishable in the response.
    #[error("invalid credentials")]
    InvalidCredentials,
}

impl ErrorExtensions for AuthError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| match self {
            AuthError::Unauthenticated => e.set("code", "UNAUTHORIZED"),
            AuthError::InvalidCredentials => e.set("code", "BAD_USER_INPUT"),
        })
    }
}

/// Sign a login token for the given user
pub fn issue_token(secret: &str, user: &UserRecord) -> anyhow::Result<String> {
    let claims = TokenClaims {
        sub: user.id.clone(),
        username: user.username.clone(),
    };
    // Header::new would also default to HS256; spelled out so the
    // algorithm matches verify_token by inspection.
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify a login token's signature and recover its claims
pub fn verify_token(secret: &str, token: &str) -> anyhow::Result<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Issued tokens carry no exp claim; don't require or validate one.
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Extension trait to get the current user from GraphQL context
pub trait AuthExt {
    /// Get the current user, or fail with an authentication error
    fn current_user(&self) -> Result<&CurrentUser>;

    /// Get the current user if present, or None
    fn try_current_user(&self) -> Option<&CurrentUser>;
}

impl AuthExt for Context<'_> {
    fn current_user(&self) -> Result<&CurrentUser> {
        self.data_opt::<CurrentUser>()
            .ok_or_else(|| AuthError::Unauthenticated.extend())
    }

    fn try_current_user(&self) -> Option<&CurrentUser> {
        self.data_opt::<CurrentUser>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserRecord {
        UserRecord {
            id: "1f6e1c6a-0000-0000-0000-000000000001".to_string(),
            username: "reader".to_string(),
            favorite_genre: "fantasy".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let user = test_user();
        let token = issue_token("secret", &user).unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, user.username);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("secret", &test_user()).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token("secret", "not-a-jwt").is_err());
    }
}
