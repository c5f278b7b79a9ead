//! HTTP gateway against the CRM backend.

use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, RequestBuilder};
use std::marker::PhantomData;
use url::Url;

use crate::session::Session;

use super::gateway::Gateway;
use super::traits::{Entity, Patch};

/// Gateway that maps store operations onto authenticated CRUD calls against
/// the collection endpoint `api/<collection>`.
pub struct RemoteGateway<E: Entity> {
  http: Client,
  base_url: Url,
  session: Session,
  _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RemoteGateway<E> {
  pub(crate) fn new(http: Client, base_url: Url, session: Session) -> Self {
    Self {
      http,
      base_url,
      session,
      _entity: PhantomData,
    }
  }

  fn collection_url(&self) -> Result<Url> {
    self
      .base_url
      .join(&format!("api/{}", E::collection()))
      .map_err(|e| eyre!("Invalid {} endpoint: {}", E::collection(), e))
  }

  fn record_url(&self, id: i64) -> Result<Url> {
    self
      .base_url
      .join(&format!("api/{}/{}", E::collection(), id))
      .map_err(|e| eyre!("Invalid {} endpoint: {}", E::collection(), e))
  }

  /// Attach the bearer token read from the session at call time.
  fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
    match self.session.token() {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }
}

impl<E: Entity> Gateway<E> for RemoteGateway<E> {
  async fn fetch_all(&self) -> Result<Vec<E>> {
    let response = self
      .authorized(self.http.get(self.collection_url()?))
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch {}: {}", E::collection(), e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to fetch {}: {}", E::collection(), e))?;

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse {} response: {}", E::collection(), e))
  }

  async fn create(&self, draft: E) -> Result<E> {
    let response = self
      .authorized(self.http.post(self.collection_url()?))
      .json(&draft)
      .send()
      .await
      .map_err(|e| eyre!("Failed to create {} record: {}", E::collection(), e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to create {} record: {}", E::collection(), e))?;

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse created {} record: {}", E::collection(), e))
  }

  async fn update(&self, id: i64, patch: &Patch) -> Result<()> {
    self
      .authorized(self.http.put(self.record_url(id)?))
      .json(patch)
      .send()
      .await
      .map_err(|e| eyre!("Failed to update {} record {}: {}", E::collection(), id, e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to update {} record {}: {}", E::collection(), id, e))?;

    Ok(())
  }

  async fn delete(&self, id: i64) -> Result<()> {
    self
      .authorized(self.http.delete(self.record_url(id)?))
      .send()
      .await
      .map_err(|e| eyre!("Failed to delete {} record {}: {}", E::collection(), id, e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to delete {} record {}: {}", E::collection(), id, e))?;

    Ok(())
  }
}
