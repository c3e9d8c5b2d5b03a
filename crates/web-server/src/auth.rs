use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::convert::Infallible;

/// The identity assumed when a request carries no usable `Authorization` header.
pub const DEFAULT_USER: &str = "user123";

/// The calling user, taken from the `Authorization` header.
///
/// Authentication is mocked: `Bearer <user>` or a bare `<user>` is trusted as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    fn from_header(value: Option<&str>) -> Self {
        let user = value
            .map(str::trim)
            .map(strip_bearer)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_USER);
        Self(user.to_string())
    }
}

fn strip_bearer(value: &str) -> &str {
    match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        Ok(Self::from_header(header))
    }
}
