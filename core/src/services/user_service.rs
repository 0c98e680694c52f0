// core/src/services/user_service.rs

//! Accounts: registration, login, profiles and admin user management.

use crate::auth::{hash_password, verify_password, Identity, TokenIssuer, MIN_PASSWORD_LEN};
use crate::error::{ShopError, ShopResult};
use crate::models::{AuthProvider, Page, PageRequest, Role, User, DEFAULT_PAGE_LIMIT};
use crate::store::UserStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

/// Profile data handed over by an OAuth provider after the token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProfile {
  pub provider: AuthProvider,
  pub provider_id: String,
  pub email: String,
  pub name: String,
  pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub name: Option<String>,
  pub email: Option<String>,
  pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserUpdate {
  pub name: Option<String>,
  pub role: Option<Role>,
  pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
  pub token: String,
  pub user: User,
}

#[derive(Clone)]
pub struct UserService {
  users: Arc<dyn UserStore>,
  tokens: TokenIssuer,
}

fn normalize_email(email: &str) -> ShopResult<String> {
  let email = email.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
    _ => Err(ShopError::validation("invalid email address")),
  }
}

fn check_password_len(password: &str) -> ShopResult<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ShopError::validation(format!(
      "password must be at least {} characters",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

fn email_taken(e: ShopError) -> ShopError {
  match e {
    ShopError::Conflict(_) => ShopError::conflict("email already registered"),
    other => other,
  }
}

impl UserService {
  pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
    Self { users, tokens }
  }

  pub fn tokens(&self) -> &TokenIssuer {
    &self.tokens
  }

  fn respond(&self, user: User) -> ShopResult<AuthResponse> {
    let token = self.tokens.issue(&user)?;
    Ok(AuthResponse { token, user })
  }

  #[instrument(name = "users::register", skip_all)]
  pub async fn register(&self, req: RegisterRequest) -> ShopResult<AuthResponse> {
    if req.name.trim().is_empty() {
      return Err(ShopError::validation("name is required"));
    }
    let email = normalize_email(&req.email)?;
    check_password_len(&req.password)?;
    if self.users.find_user_by_email(&email).await?.is_some() {
      return Err(ShopError::conflict("email already registered"));
    }

    let user = User::new_local(req.name.trim().to_string(), email, hash_password(&req.password)?);
    self.users.insert_user(&user).await.map_err(email_taken)?;
    info!(user_id = %user.id, "User registered.");
    self.respond(user)
  }

  #[instrument(name = "users::login", skip_all)]
  pub async fn login(&self, req: LoginRequest) -> ShopResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();
    let user = self
      .users
      .find_user_by_email(&email)
      .await?
      .ok_or_else(|| ShopError::unauthorized("invalid email or password"))?;

    let Some(stored_hash) = user.password_hash.as_deref().filter(|_| user.provider == AuthProvider::Local) else {
      return Err(ShopError::validation(format!(
        "this account uses {:?} sign-in, please log in with your provider",
        user.provider
      )));
    };
    if !verify_password(stored_hash, &req.password)? {
      warn!(user_id = %user.id, "Failed login attempt.");
      return Err(ShopError::unauthorized("invalid email or password"));
    }
    self.respond(user)
  }

  /// Signs in with a provider profile, creating the account on first use. An
  /// existing account with the same email is linked to the provider.
  #[instrument(name = "users::oauth_login", skip_all, fields(provider = ?profile.provider))]
  pub async fn oauth_login(&self, profile: OAuthProfile) -> ShopResult<AuthResponse> {
    if profile.provider == AuthProvider::Local {
      return Err(ShopError::validation("unsupported auth provider"));
    }
    let email = normalize_email(&profile.email)?;
    let now = Utc::now();

    let user = match self.users.find_user_by_email(&email).await? {
      Some(mut user) => {
        user.provider = profile.provider;
        user.provider_id = Some(profile.provider_id);
        if profile.avatar_url.is_some() {
          user.avatar_url = profile.avatar_url;
        }
        user.is_verified = true;
        user.updated_at = now;
        self.users.update_user(&user).await?;
        user
      }
      None => {
        let user = User {
          id: Uuid::new_v4(),
          email,
          password_hash: None,
          name: profile.name,
          role: Role::User,
          provider: profile.provider,
          provider_id: Some(profile.provider_id),
          avatar_url: profile.avatar_url,
          is_verified: true,
          created_at: now,
          updated_at: now,
          deleted_at: None,
        };
        self.users.insert_user(&user).await.map_err(email_taken)?;
        info!(user_id = %user.id, "User registered through OAuth.");
        user
      }
    };
    self.respond(user)
  }

  pub async fn profile(&self, user_id: Uuid) -> ShopResult<User> {
    self
      .users
      .find_user(user_id)
      .await?
      .ok_or_else(|| ShopError::not_found("user not found"))
  }

  pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> ShopResult<User> {
    let mut user = self.profile(user_id).await?;
    if let Some(name) = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
      user.name = name.to_string();
    }
    if let Some(email) = update.email.as_deref().filter(|e| !e.trim().is_empty()) {
      let email = normalize_email(email)?;
      if email != user.email {
        if self.users.find_user_by_email(&email).await?.is_some() {
          return Err(ShopError::conflict("email already registered"));
        }
        user.email = email;
      }
    }
    if update.avatar_url.is_some() {
      user.avatar_url = update.avatar_url;
    }
    user.updated_at = Utc::now();
    self.users.update_user(&user).await.map_err(email_taken)?;
    Ok(user)
  }

  #[instrument(name = "users::change_password", skip(self, old_password, new_password))]
  pub async fn change_password(&self, user_id: Uuid, old_password: &str, new_password: &str) -> ShopResult<()> {
    let mut user = self.profile(user_id).await?;
    let stored_hash = match (&user.provider, user.password_hash.as_deref()) {
      (AuthProvider::Local, Some(hash)) => hash,
      _ => return Err(ShopError::validation("password change is only available for local accounts")),
    };
    if !verify_password(stored_hash, old_password)? {
      return Err(ShopError::unauthorized("current password is incorrect"));
    }
    check_password_len(new_password)?;

    user.password_hash = Some(hash_password(new_password)?);
    user.updated_at = Utc::now();
    self.users.update_user(&user).await?;
    info!(%user_id, "Password changed.");
    Ok(())
  }

  pub async fn delete_account(&self, user_id: Uuid) -> ShopResult<()> {
    self.profile(user_id).await?;
    self.users.soft_delete_user(user_id).await
  }

  // admin

  pub async fn list_users(&self, admin: Identity, page: PageRequest) -> ShopResult<Page<User>> {
    admin.require_admin()?;
    self.users.list_users(page.normalized(DEFAULT_PAGE_LIMIT)).await
  }

  pub async fn get_user(&self, admin: Identity, user_id: Uuid) -> ShopResult<User> {
    admin.require_admin()?;
    self.profile(user_id).await
  }

  #[instrument(name = "users::admin_update", skip(self, update), fields(admin_id = %admin.user_id))]
  pub async fn update_user(&self, admin: Identity, user_id: Uuid, update: AdminUserUpdate) -> ShopResult<User> {
    admin.require_admin()?;
    let mut user = self.profile(user_id).await?;
    if let Some(name) = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
      user.name = name.to_string();
    }
    if let Some(role) = update.role {
      user.role = role;
    }
    if let Some(is_verified) = update.is_verified {
      user.is_verified = is_verified;
    }
    user.updated_at = Utc::now();
    self.users.update_user(&user).await?;
    Ok(user)
  }

  #[instrument(name = "users::admin_delete", skip(self), fields(admin_id = %admin.user_id))]
  pub async fn delete_user(&self, admin: Identity, user_id: Uuid) -> ShopResult<()> {
    admin.require_admin()?;
    if admin.user_id == user_id {
      return Err(ShopError::validation("cannot delete your own account from the admin panel"));
    }
    self.profile(user_id).await?;
    self.users.soft_delete_user(user_id).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emails_are_normalized() {
    assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
    assert!(normalize_email("not-an-email").is_err());
    assert!(normalize_email("@example.com").is_err());
  }

  #[test]
  fn short_passwords_are_rejected() {
    assert!(check_password_len("12345").is_err());
    assert!(check_password_len("123456").is_ok());
  }
}
