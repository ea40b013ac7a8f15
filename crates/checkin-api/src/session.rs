//! Signed bearer sessions and password-reset tokens.
//!
//! Both are HS256 JWTs with typed claims. Decoding into the wrong claim type
//! fails, so a reset token can never be used as a session and vice versa.

use chrono::{TimeDelta, Utc};
use checkin_core::volunteer::Volunteer;
use jsonwebtoken::{
  DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ApiError;

pub const SESSION_TTL: TimeDelta = TimeDelta::hours(3);
pub const ADMIN_SESSION_TTL: TimeDelta = TimeDelta::days(30);
pub const RESET_TTL: TimeDelta = TimeDelta::minutes(15);

const RESET_PURPOSE: &str = "password_reset";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
  pub sub:      Uuid,
  pub is_admin: bool,
  pub exp:      i64,
  pub iat:      i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
  pub sub:     Uuid,
  pub purpose: String,
  pub exp:     i64,
}

/// Keys derived once from the configured secret.
pub struct SessionKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl SessionKeys {
  pub fn new(secret: &[u8]) -> Self {
    Self {
      encoding:   EncodingKey::from_secret(secret),
      decoding:   DecodingKey::from_secret(secret),
      validation: Validation::default(),
    }
  }

  /// Sign a session for `volunteer`. Admin sessions live longer.
  pub fn issue_session(&self, volunteer: &Volunteer) -> Result<String, ApiError> {
    let now = Utc::now();
    let ttl = if volunteer.is_admin { ADMIN_SESSION_TTL } else { SESSION_TTL };
    let claims = SessionClaims {
      sub:      volunteer.id,
      is_admin: volunteer.is_admin,
      exp:      (now + ttl).timestamp(),
      iat:      now.timestamp(),
    };
    self.sign(&claims)
  }

  pub fn verify_session(&self, token: &str) -> Result<SessionClaims, ApiError> {
    decode::<SessionClaims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::Unauthorized("session expired".into()),
        _ => ApiError::Unauthorized("invalid session".into()),
      })
  }

  pub fn issue_reset(&self, volunteer_id: Uuid) -> Result<String, ApiError> {
    let claims = ResetClaims {
      sub:     volunteer_id,
      purpose: RESET_PURPOSE.to_owned(),
      exp:     (Utc::now() + RESET_TTL).timestamp(),
    };
    self.sign(&claims)
  }

  /// The volunteer a reset token was issued for.
  pub fn verify_reset(&self, token: &str) -> Result<Uuid, ApiError> {
    let invalid = || ApiError::BadRequest("reset token is invalid or expired".into());
    let claims = decode::<ResetClaims>(token, &self.decoding, &self.validation)
      .map_err(|_| invalid())?
      .claims;
    if claims.purpose != RESET_PURPOSE {
      return Err(invalid());
    }
    Ok(claims.sub)
  }

  fn sign<T: Serialize>(&self, claims: &T) -> Result<String, ApiError> {
    encode(&Header::default(), claims, &self.encoding)
      .map_err(|e| ApiError::Internal(Box::new(e)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn keys() -> SessionKeys { SessionKeys::new(b"test-secret") }

  fn volunteer(is_admin: bool) -> Volunteer {
    Volunteer {
      id: Uuid::new_v4(),
      name: "Ana Souza".into(),
      email: "ana@example.com".into(),
      roles: vec![],
      password_hash: String::new(),
      is_admin,
      photo_url: None,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn session_roundtrip() {
    let v = volunteer(false);
    let token = keys().issue_session(&v).unwrap();
    let claims = keys().verify_session(&token).unwrap();
    assert_eq!(claims.sub, v.id);
    assert!(!claims.is_admin);
    assert_eq!(claims.exp - claims.iat, SESSION_TTL.num_seconds());
  }

  #[test]
  fn admin_sessions_last_longer() {
    let token = keys().issue_session(&volunteer(true)).unwrap();
    let claims = keys().verify_session(&token).unwrap();
    assert!(claims.is_admin);
    assert_eq!(claims.exp - claims.iat, ADMIN_SESSION_TTL.num_seconds());
  }

  #[test]
  fn expired_session_is_reported_as_expired() {
    let now = Utc::now().timestamp();
    let claims = SessionClaims { sub: Uuid::new_v4(), is_admin: false, exp: now - 3600, iat: now - 7200 };
    let token = keys().sign(&claims).unwrap();
    match keys().verify_session(&token) {
      Err(ApiError::Unauthorized(m)) => assert_eq!(m, "session expired"),
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let token = keys().issue_session(&volunteer(false)).unwrap();
    let other = SessionKeys::new(b"another-secret");
    assert!(matches!(other.verify_session(&token), Err(ApiError::Unauthorized(_))));
  }

  #[test]
  fn reset_and_session_tokens_do_not_mix() {
    let v = volunteer(false);
    let reset = keys().issue_reset(v.id).unwrap();
    assert_eq!(keys().verify_reset(&reset).unwrap(), v.id);
    assert!(keys().verify_session(&reset).is_err());

    let session = keys().issue_session(&v).unwrap();
    assert!(matches!(keys().verify_reset(&session), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn reset_token_with_other_purpose_is_rejected() {
    let claims = ResetClaims {
      sub:     Uuid::new_v4(),
      purpose: "email_change".into(),
      exp:     (Utc::now() + RESET_TTL).timestamp(),
    };
    let token = keys().sign(&claims).unwrap();
    assert!(keys().verify_reset(&token).is_err());
  }
}
