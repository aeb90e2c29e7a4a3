//! Caller extraction from request headers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use super::AppState;
use crate::auth::AuthenticatedCaller;
use crate::error::Error;

/// Header used by older clients that send the token without a scheme.
const LEGACY_HEADER: &str = "bearer";

/// Verified identity of the requester.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub AuthenticatedCaller);

/// Pull the bearer token out of `Authorization: Bearer <t>` or the legacy `Bearer: <t>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let (scheme, token) = value.to_str().ok()?.trim().split_once(' ')?;
        return scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| token.trim());
    }
    headers
        .get(LEGACY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(Error::MissingToken)?;
        let caller = state.tokens.verify(token).inspect_err(|e| {
            debug!("Rejected token for {}: {}", parts.uri.path(), e);
        })?;
        Ok(Caller(caller))
    }
}
