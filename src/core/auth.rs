//! Caller identity for ownership checks
//!
//! Authentication itself is an upstream concern: a gateway or middleware in
//! front of this service verifies credentials and forwards the caller
//! identity in trusted headers (`x-user-id`, `x-user-roles`). This module
//! extracts that identity into an [`AuthContext`] which services use for
//! ownership decisions. A request without identity extracts to
//! [`AuthContext::Anonymous`]; protected operations reject it with 401.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::core::error::{ApiError, AuthError};

/// Role name that grants access to every order regardless of ownership
pub const ADMIN_ROLE: &str = "admin";

/// Caller identity extracted from a request
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid, roles: Vec<String> },

    /// No identity supplied (public access)
    Anonymous,
}

impl AuthContext {
    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }

    /// Check if the caller carries the admin role
    pub fn is_admin(&self) -> bool {
        match self {
            AuthContext::User { roles, .. } => roles.iter().any(|r| r == ADMIN_ROLE),
            AuthContext::Anonymous => false,
        }
    }

    /// Require an authenticated user, rejecting anonymous callers
    pub fn require_user(&self) -> Result<Uuid, ApiError> {
        self.user_id()
            .ok_or(ApiError::Auth(AuthError::Unauthenticated))
    }

    /// Check whether the caller may access a resource owned by `owner_id`.
    ///
    /// Admins may access everything; users only their own resources;
    /// anonymous callers nothing.
    pub fn can_access(&self, owner_id: &Uuid) -> bool {
        match self {
            AuthContext::User { user_id, .. } => self.is_admin() || user_id == owner_id,
            AuthContext::Anonymous => false,
        }
    }

    /// Build a context from trusted identity headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());

        match user_id {
            Some(user_id) => {
                let roles = headers
                    .get("x-user-roles")
                    .and_then(|v| v.to_str().ok())
                    .map(|s| {
                        s.split(',')
                            .map(|r| r.trim().to_string())
                            .filter(|r| !r.is_empty())
                            .collect()
                    })
                    .unwrap_or_default();
                AuthContext::User { user_id, roles }
            }
            None => AuthContext::Anonymous,
        }
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthContext::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(user_id: Option<&str>, roles: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(id) = user_id {
            headers.insert("x-user-id", HeaderValue::from_str(id).unwrap());
        }
        if let Some(roles) = roles {
            headers.insert("x-user-roles", HeaderValue::from_str(roles).unwrap());
        }
        headers
    }

    #[test]
    fn test_missing_identity_is_anonymous() {
        let ctx = AuthContext::from_headers(&headers_with(None, None));
        assert!(matches!(ctx, AuthContext::Anonymous));
        assert!(ctx.require_user().is_err());
    }

    #[test]
    fn test_malformed_user_id_is_anonymous() {
        let ctx = AuthContext::from_headers(&headers_with(Some("not-a-uuid"), None));
        assert!(matches!(ctx, AuthContext::Anonymous));
    }

    #[test]
    fn test_user_identity_extracted() {
        let id = Uuid::new_v4();
        let ctx = AuthContext::from_headers(&headers_with(Some(&id.to_string()), Some("member")));
        assert_eq!(ctx.user_id(), Some(id));
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_admin_role_parsed_from_list() {
        let id = Uuid::new_v4();
        let ctx =
            AuthContext::from_headers(&headers_with(Some(&id.to_string()), Some("member, admin")));
        assert!(ctx.is_admin());
    }

    #[test]
    fn test_ownership_check() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let owner_ctx = AuthContext::User {
            user_id: owner,
            roles: vec![],
        };
        let other_ctx = AuthContext::User {
            user_id: other,
            roles: vec![],
        };
        let admin_ctx = AuthContext::User {
            user_id: other,
            roles: vec![ADMIN_ROLE.to_string()],
        };

        assert!(owner_ctx.can_access(&owner));
        assert!(!other_ctx.can_access(&owner));
        assert!(admin_ctx.can_access(&owner));
        assert!(!AuthContext::Anonymous.can_access(&owner));
    }
}
