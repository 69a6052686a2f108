use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

use super::traits::AuthError;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

impl AuthRequest {
    /// Access token sent with the request, if any.
    ///
    /// `Authorization: Bearer <token>` wins over `X-API-Key`. Any other
    /// `Authorization` scheme, or a bearer header with no token, is an error
    /// rather than a silent fall back to anonymous.
    pub fn access_token(&self) -> Result<Option<&str>, AuthError> {
        if let Some(header) = self.headers.get("authorization") {
            let (scheme, token) = header.trim().split_once(' ').unwrap_or((header.trim(), ""));
            if !scheme.eq_ignore_ascii_case("bearer") {
                return Err(AuthError::UnsupportedScheme(scheme.to_string()));
            }
            let token = token.trim();
            if token.is_empty() {
                return Err(AuthError::UnknownToken);
            }
            return Ok(Some(token));
        }

        Ok(self
            .headers
            .get("x-api-key")
            .map(|key| key.trim())
            .filter(|key| !key.is_empty()))
    }
}

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Set for registered users, `None` for anonymous callers.
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            username: None,
            method: "none".to_string(),
        }
    }

    pub fn user(user_id: i64, username: impl Into<String>, method: &str) -> Self {
        Self {
            user_id: Some(user_id),
            username: Some(username.into()),
            method: method.to_string(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}
