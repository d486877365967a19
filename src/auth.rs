//! Bearer token authentication for the HTTP transport.
//!
//! When tokens are configured every request must carry
//! `Authorization: Bearer <token>`. Tokens are compared in constant time.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

const BEARER_PREFIX: &str = "Bearer ";

/// Accepted bearer tokens.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    tokens: Vec<String>,
}

impl AuthConfig {
    /// Build from configured tokens. Blank entries are rejected so a stray
    /// comma in `MCP_AUTH_TOKENS` cannot silently admit an empty token.
    pub fn from_tokens(tokens: &[String]) -> Result<Self, String> {
        let mut accepted: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                return Err("Empty token value in auth token configuration".to_string());
            }
            if !accepted.iter().any(|t| t == trimmed) {
                accepted.push(trimmed.to_string());
            }
        }
        Ok(Self { tokens: accepted })
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Whether `provided` matches any configured token. Every token is
    /// compared so timing does not reveal which one matched.
    pub fn verify(&self, provided: &str) -> bool {
        self.tokens.iter().fold(false, |found, expected| {
            let matches: bool = expected.as_bytes().ct_eq(provided.as_bytes()).into();
            found | matches
        })
    }
}

/// Axum middleware enforcing bearer authentication.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth.is_enabled() {
        return next.run(request).await;
    }

    let token = match bearer_token(&request) {
        Ok(token) => token,
        Err(reason) => {
            warn!(reason, "Authentication failed");
            return unauthorized(reason);
        }
    };

    if auth.verify(token) {
        debug!("Request authenticated");
        next.run(request).await
    } else {
        warn!(token_prefix = %mask_token(token), "Authentication failed: invalid token");
        unauthorized("Invalid Bearer token")
    }
}

fn bearer_token(request: &Request<Body>) -> Result<&str, &'static str> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or("Missing Bearer token in Authorization header")?;
    let value = header
        .to_str()
        .map_err(|_| "Authorization header contains invalid characters")?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or("Invalid Authorization header format. Expected 'Bearer <token>'")?;
    if token.is_empty() {
        return Err("Bearer token is empty");
    }
    Ok(token)
}

fn mask_token(token: &str) -> String {
    match token.char_indices().nth(3) {
        Some((idx, _)) => format!("{}***", &token[..idx]),
        None => "***".to_string(),
    }
}

#[derive(Serialize)]
struct UnauthorizedBody {
    kind: &'static str,
    message: &'static str,
    suggestion: &'static str,
}

fn unauthorized(message: &'static str) -> Response {
    let body = UnauthorizedBody {
        kind: "Unauthorized",
        message,
        suggestion: "Send 'Authorization: Bearer <token>' with a token configured on the server",
    };
    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header_value: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_from_tokens() {
        let auth = AuthConfig::from_tokens(&["a1".to_string(), " a1 ".to_string(), "b2".to_string()])
            .unwrap();
        assert!(auth.is_enabled());
        assert_eq!(auth.token_count(), 2);
    }

    #[test]
    fn test_from_tokens_rejects_blank() {
        assert!(AuthConfig::from_tokens(&["a1".to_string(), "  ".to_string()]).is_err());
    }

    #[test]
    fn test_disabled() {
        assert!(!AuthConfig::disabled().is_enabled());
        assert!(!AuthConfig::from_tokens(&[]).unwrap().is_enabled());
    }

    #[test]
    fn test_verify() {
        let auth = AuthConfig::from_tokens(&["secret-one".to_string(), "secret-two".to_string()])
            .unwrap();
        assert!(auth.verify("secret-one"));
        assert!(auth.verify("secret-two"));
        assert!(!auth.verify("secret"));
        assert!(!auth.verify(""));
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&request_with(Some("Bearer abc"))), Ok("abc"));
        assert!(bearer_token(&request_with(None)).is_err());
        assert!(bearer_token(&request_with(Some("Basic abc"))).is_err());
        assert!(bearer_token(&request_with(Some("Bearer "))).is_err());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdef"), "abc***");
        assert_eq!(mask_token("ab"), "***");
        assert_eq!(mask_token("abc"), "***");
    }
}
