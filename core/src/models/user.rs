// core/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Admin => "admin",
    }
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "user" => Ok(Role::User),
      "admin" => Ok(Role::Admin),
      other => Err(format!("unknown role '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "auth_provider_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
  Local,
  Google,
  Github,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing, default)]
  pub password_hash: Option<String>,
  pub name: String,
  pub role: Role,
  pub provider: AuthProvider,
  pub provider_id: Option<String>,
  pub avatar_url: Option<String>,
  pub is_verified: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing)]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
  pub fn new_local(name: String, email: String, password_hash: String) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email,
      password_hash: Some(password_hash),
      name,
      role: Role::User,
      provider: AuthProvider::Local,
      provider_id: None,
      avatar_url: None,
      is_verified: false,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}
