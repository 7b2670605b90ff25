//! Caller identity asserted by the upstream identity provider.
//!
//! The provider authenticates the user and forwards a stable id in
//! `x-user-id` and, optionally, a display name in `x-user-name`.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use debate_core::user::{Identity, UserId};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
  parts.headers.get(name).and_then(|v| v.to_str().ok())
}

fn identity_from(parts: &Parts) -> Option<Identity> {
  let user_id = UserId::new(header(parts, USER_ID_HEADER)?)?;
  let identity = Identity::new(user_id);
  Some(match header(parts, USER_NAME_HEADER).map(str::trim) {
    Some(name) if !name.is_empty() => identity.with_name(name),
    _ => identity,
  })
}

/// A signed-in caller; rejects with 401 otherwise.
pub struct Caller(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    identity_from(parts).map(Caller).ok_or(ApiError::Unauthorized)
  }
}

/// The caller if signed in; anonymous viewers are allowed.
pub struct Viewer(pub Option<Identity>);

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    Ok(Viewer(identity_from(parts)))
  }
}

impl Viewer {
  pub fn user_id(&self) -> Option<UserId> {
    self.0.as_ref().map(|i| i.user_id.clone())
  }
}
