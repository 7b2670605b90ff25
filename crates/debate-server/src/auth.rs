//! Bearer-secret extractor guarding the `/cron` endpoints.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};

use crate::{AppState, error::Error};

/// The scheduler's shared secret, as an argon2 PHC string.
#[derive(Clone, Debug)]
pub struct CronAuth {
  secret_hash: Option<String>,
}

impl CronAuth {
  /// Fails if `secret_hash` is present but not a PHC string.
  pub fn new(secret_hash: Option<String>) -> Result<Self, Error> {
    if let Some(hash) = &secret_hash {
      PasswordHash::new(hash).map_err(|e| Error::BadSecretHash(e.to_string()))?;
    } else {
      tracing::warn!("no cron secret configured; /cron endpoints are unauthenticated");
    }
    Ok(Self { secret_hash })
  }

  pub fn is_open(&self) -> bool { self.secret_hash.is_none() }
}

/// Zero-size marker: present in the handler means the scheduler is trusted.
pub struct CronAuthorized;

/// Verify `Authorization: Bearer <secret>` against the configured hash.
pub fn verify_cron(headers: &HeaderMap, auth: &CronAuth) -> Result<(), Error> {
  let Some(hash) = &auth.secret_hash else {
    return Ok(());
  };

  let secret = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(Error::Unauthorized)?;

  let parsed = PasswordHash::new(hash).map_err(|_| Error::Unauthorized)?;
  Argon2::default()
    .verify_password(secret.trim().as_bytes(), &parsed)
    .map_err(|_| Error::Unauthorized)
}

impl<S, G, A> FromRequestParts<AppState<S, G, A>> for CronAuthorized
where
  S: Send + Sync,
  G: Send + Sync,
  A: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, G, A>,
  ) -> Result<Self, Self::Rejection> {
    verify_cron(&parts.headers, &state.auth)?;
    Ok(CronAuthorized)
  }
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  use super::*;

  fn hashed(secret: &str) -> CronAuth {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(secret.as_bytes(), &salt)
      .unwrap()
      .to_string();
    CronAuth::new(Some(hash)).unwrap()
  }

  fn bearer(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn correct_secret() {
    assert!(verify_cron(&bearer("Bearer s3cret"), &hashed("s3cret")).is_ok());
  }

  #[test]
  fn wrong_secret() {
    let auth = hashed("s3cret");
    assert!(matches!(verify_cron(&bearer("Bearer nope"), &auth), Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_or_malformed_header() {
    let auth = hashed("s3cret");
    assert!(matches!(verify_cron(&HeaderMap::new(), &auth), Err(Error::Unauthorized)));
    assert!(matches!(verify_cron(&bearer("Basic s3cret"), &auth), Err(Error::Unauthorized)));
  }

  #[test]
  fn unset_secret_is_open() {
    let auth = CronAuth::new(None).unwrap();
    assert!(auth.is_open());
    assert!(verify_cron(&HeaderMap::new(), &auth).is_ok());
  }

  #[test]
  fn garbage_hash_is_rejected_at_startup() {
    assert!(matches!(
      CronAuth::new(Some("not-a-phc-string".into())),
      Err(Error::BadSecretHash(_))
    ));
  }
}
