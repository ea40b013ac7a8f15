//! Bearer-session extractors.

use std::convert::Infallible;

use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use crate::{ApiError, AppState, Backend};

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
  pub id:       Uuid,
  pub is_admin: bool,
}

/// An authenticated caller holding the admin flag.
#[derive(Debug, Clone, Copy)]
pub struct Admin(pub Identity);

fn bearer(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl<B: Backend> FromRequestParts<AppState<B>> for Identity {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;
    let claims = state.sessions.verify_session(token)?;
    Ok(Identity { id: claims.sub, is_admin: claims.is_admin })
  }
}

/// Any session failure reads as "no caller"; the handler decides whether that
/// matters.
impl<B: Backend> OptionalFromRequestParts<AppState<B>> for Identity {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B>,
  ) -> Result<Option<Self>, Self::Rejection> {
    let identity = <Identity as FromRequestParts<AppState<B>>>::from_request_parts(parts, state)
      .await
      .inspect_err(|e| tracing::debug!(error = %e, "ignoring unusable session"))
      .ok();
    Ok(identity)
  }
}

impl<B: Backend> FromRequestParts<AppState<B>> for Admin {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B>,
  ) -> Result<Self, Self::Rejection> {
    let identity = <Identity as FromRequestParts<AppState<B>>>::from_request_parts(parts, state).await?;
    if !identity.is_admin {
      return Err(ApiError::Forbidden);
    }
    Ok(Admin(identity))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn bearer_is_extracted() {
    assert_eq!(bearer(&headers("Bearer abc.def")), Some("abc.def"));
  }

  #[test]
  fn other_schemes_and_empty_tokens_are_ignored() {
    assert_eq!(bearer(&headers("Basic dXNlcjpwYXNz")), None);
    assert_eq!(bearer(&headers("Bearer ")), None);
    assert_eq!(bearer(&HeaderMap::new()), None);
  }
}
