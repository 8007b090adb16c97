//! Identity extraction from bearer tokens.
//!
//! Token validation belongs to the external identity service; this module
//! only consumes its result. The [`IdentityVerifier`] trait is that
//! service's interface, and [`StaticTokenVerifier`] is the in-memory
//! implementation used by deployments that provision opaque tokens through
//! configuration, and by tests.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use common::{Role, UserId};
use store::Store;

use crate::AppState;
use crate::error::ApiError;

/// The verified identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

/// Interface of the external identity service.
pub trait IdentityVerifier: Send + Sync {
    /// Resolves a bearer token to a verified identity, or `None` when the
    /// token is unknown or invalid.
    fn verify(&self, token: &str) -> Option<Identity>;
}

/// Verifier backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    /// Creates an empty verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token for an identity.
    pub fn insert(&mut self, token: impl Into<String>, identity: Identity) {
        self.tokens.insert(token.into(), identity);
    }

    /// Parses a `token:user_id:role` comma-separated specification, as
    /// provided through the `AUTH_TOKENS` environment variable.
    pub fn parse(spec: &str) -> Result<Self, InvalidTokenSpec> {
        let mut verifier = Self::new();
        for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
            let mut parts = entry.trim().splitn(3, ':');
            let (Some(token), Some(user), Some(role)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(InvalidTokenSpec(entry.to_string()));
            };
            let user_id = user
                .parse::<uuid::Uuid>()
                .map_err(|_| InvalidTokenSpec(entry.to_string()))?;
            let role = role
                .parse::<Role>()
                .map_err(|_| InvalidTokenSpec(entry.to_string()))?;
            verifier.insert(
                token,
                Identity {
                    user_id: UserId::from_uuid(user_id),
                    role,
                },
            );
        }
        Ok(verifier)
    }
}

impl IdentityVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).copied()
    }
}

/// Error returned for a malformed `AUTH_TOKENS` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTokenSpec(pub String);

impl std::fmt::Display for InvalidTokenSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid AUTH_TOKENS entry: {}", self.0)
    }
}

impl std::error::Error for InvalidTokenSpec {}

fn bearer_identity<S: Store>(
    parts: &Parts,
    state: &Arc<AppState<S>>,
) -> Result<Identity, ApiError> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;
    state.verifier.verify(token).ok_or(ApiError::Unauthorized)
}

/// Extractor for endpoints restricted to the Cliente role.
#[derive(Debug, Clone, Copy)]
pub struct ClientUser(pub Identity);

impl<S: Store + 'static> FromRequestParts<Arc<AppState<S>>> for ClientUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let identity = bearer_identity(parts, state)?;
        if identity.role != Role::Cliente {
            return Err(ApiError::Forbidden);
        }
        Ok(ClientUser(identity))
    }
}

/// Extractor for endpoints restricted to the Admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Identity);

impl<S: Store + 'static> FromRequestParts<Arc<AppState<S>>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let identity = bearer_identity(parts, state)?;
        if identity.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_spec() {
        let user = uuid::Uuid::new_v4();
        let spec = format!("tok-1:{user}:Cliente, tok-2:{user}:Admin");
        let verifier = StaticTokenVerifier::parse(&spec).unwrap();

        let identity = verifier.verify("tok-1").unwrap();
        assert_eq!(identity.role, Role::Cliente);
        assert_eq!(identity.user_id.as_uuid(), user);
        assert_eq!(verifier.verify("tok-2").unwrap().role, Role::Admin);
        assert!(verifier.verify("tok-3").is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        assert!(StaticTokenVerifier::parse("just-a-token").is_err());
        assert!(StaticTokenVerifier::parse("tok:not-a-uuid:Admin").is_err());
        let user = uuid::Uuid::new_v4();
        assert!(StaticTokenVerifier::parse(&format!("tok:{user}:Root")).is_err());
    }

    #[test]
    fn test_parse_empty_spec_is_empty_verifier() {
        let verifier = StaticTokenVerifier::parse("").unwrap();
        assert!(verifier.verify("anything").is_none());
    }
}
