// core/src/auth.rs

//! Caller identity, password hashing and bearer-token issuing.

use crate::error::{ShopError, ShopResult};
use crate::models::{Role, User};
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Who is calling. Supplied by the transport layer and trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
  pub user_id: Uuid,
  pub role: Role,
}

impl Identity {
  pub fn user(user_id: Uuid) -> Self {
    Self {
      user_id,
      role: Role::User,
    }
  }

  pub fn admin(user_id: Uuid) -> Self {
    Self {
      user_id,
      role: Role::Admin,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn require_admin(&self) -> ShopResult<()> {
    if self.is_admin() {
      Ok(())
    } else {
      Err(ShopError::unauthorized("admin access required"))
    }
  }

  /// Owner of the resource, or any admin.
  pub fn can_access(&self, owner_id: Uuid) -> bool {
    self.user_id == owner_id || self.is_admin()
  }
}

#[instrument(name = "auth::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> ShopResult<String> {
  if password.is_empty() {
    return Err(ShopError::validation("password cannot be empty"));
  }
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      ShopError::Internal(format!("password hashing failed: {}", e))
    })
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unusable.
#[instrument(name = "auth::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> ShopResult<bool> {
  if provided.is_empty() {
    return Ok(false);
  }
  let parsed = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "Failed to parse stored password hash.");
    ShopError::Internal(format!("invalid stored password hash: {}", e))
  })?;
  match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password mismatch.");
      Ok(false)
    }
    Err(e) => Err(ShopError::Internal(format!("password verification failed: {}", e))),
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub email: String,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl: Duration,
}

impl TokenIssuer {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl,
    }
  }

  pub fn issue(&self, user: &User) -> ShopResult<String> {
    let now = Utc::now();
    let claims = Claims {
      sub: user.id,
      email: user.email.clone(),
      role: user.role,
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ShopError::Internal(format!("failed to sign token: {}", e)))
  }

  pub fn verify(&self, token: &str) -> ShopResult<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|e| {
        debug!(error = %e, "Rejected bearer token.");
        ShopError::unauthorized("invalid or expired token")
      })
  }

  pub fn identity(&self, token: &str) -> ShopResult<Identity> {
    let claims = self.verify(token)?;
    Ok(Identity {
      user_id: claims.sub,
      role: claims.role,
    })
  }
}
