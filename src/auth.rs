//! Authentication client for the CRM backend.
//!
//! The synchronization engine only ever reads the bearer token; this is the
//! collaborator that writes it.

use color_eyre::{eyre::eyre, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::session::Session;
use crate::sync::Context;

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
  pub name: String,
  pub email: String,
}

#[derive(Deserialize)]
struct AuthResponse {
  name: String,
  email: String,
  token: String,
}

pub struct AuthClient {
  http: Client,
  base_url: Url,
  session: Session,
}

impl AuthClient {
  pub fn new(ctx: &Context) -> Self {
    Self {
      http: ctx.http().clone(),
      base_url: ctx.base_url().clone(),
      session: ctx.session().clone(),
    }
  }

  /// Sign in and store the bearer token in the session.
  pub async fn login(&self, email: &str, password: &str) -> Result<User> {
    let response = self
      .post(
        "api/auth/login",
        &serde_json::json!({ "email": email, "password": password }),
      )
      .await?;

    self.session.set_token(&response.token)?;
    Ok(User {
      name: response.name,
      email: response.email,
    })
  }

  /// Create an account, sign in and store the bearer token.
  pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
    let response = self
      .post(
        "api/auth/register",
        &serde_json::json!({ "name": name, "email": email, "password": password }),
      )
      .await?;

    self.session.set_token(&response.token)?;
    Ok(User {
      name: response.name,
      email: response.email,
    })
  }

  /// End the session: clears the token and the account type flag.
  pub fn logout(&self) -> Result<()> {
    self.session.clear()
  }

  async fn post(&self, path: &str, body: &serde_json::Value) -> Result<AuthResponse> {
    let url = self
      .base_url
      .join(path)
      .map_err(|e| eyre!("Invalid auth endpoint {}: {}", path, e))?;

    let response = self
      .http
      .post(url)
      .json(body)
      .send()
      .await
      .map_err(|e| eyre!("Auth request failed: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Auth request failed: {}", e))?;

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse auth response: {}", e))
  }
}
