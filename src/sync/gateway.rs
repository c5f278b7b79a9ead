//! Gateway interface: one contract, two persistence backends.

use color_eyre::Result;

use super::local::LocalGateway;
use super::remote::RemoteGateway;
use super::traits::{Entity, Patch};

/// Contract shared by the remote and local persistence backends.
///
/// `fetch_all` and `create` return canonical records; `update` and `delete`
/// only report success, the store computes the resulting cache value from
/// the request payload itself.
pub(crate) trait Gateway<E: Entity> {
  async fn fetch_all(&self) -> Result<Vec<E>>;
  async fn create(&self, draft: E) -> Result<E>;
  async fn update(&self, id: i64, patch: &Patch) -> Result<()>;
  async fn delete(&self, id: i64) -> Result<()>;
}

/// The gateway the mode selector picked for a single call.
pub(crate) enum ActiveGateway<'a, E: Entity> {
  Remote(&'a RemoteGateway<E>),
  Local(&'a LocalGateway<E>),
}

impl<E: Entity> Gateway<E> for ActiveGateway<'_, E> {
  async fn fetch_all(&self) -> Result<Vec<E>> {
    match self {
      Self::Remote(gateway) => gateway.fetch_all().await,
      Self::Local(gateway) => gateway.fetch_all().await,
    }
  }

  async fn create(&self, draft: E) -> Result<E> {
    match self {
      Self::Remote(gateway) => gateway.create(draft).await,
      Self::Local(gateway) => gateway.create(draft).await,
    }
  }

  async fn update(&self, id: i64, patch: &Patch) -> Result<()> {
    match self {
      Self::Remote(gateway) => gateway.update(id, patch).await,
      Self::Local(gateway) => gateway.update(id, patch).await,
    }
  }

  async fn delete(&self, id: i64) -> Result<()> {
    match self {
      Self::Remote(gateway) => gateway.delete(id).await,
      Self::Local(gateway) => gateway.delete(id).await,
    }
  }
}
