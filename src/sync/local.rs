//! Demo-mode gateway over device storage.
//!
//! The whole collection lives as one JSON array under a single key. Every
//! mutation is a read-modify-write of that blob; a failure terminates the
//! call before anything is written, so no partial write is ever observable.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

use crate::storage::DeviceStorage;

use super::gateway::Gateway;
use super::traits::{merge_record, Entity, IdPolicy, Patch};

/// Gateway backed by the `dummy_<collection>` blob in device storage.
///
/// Acts as its own store of record while the session is in demo mode; it
/// holds no state of its own beyond the blob.
pub struct LocalGateway<E: Entity> {
  storage: Arc<dyn DeviceStorage>,
  policy: Arc<dyn IdPolicy<E>>,
}

impl<E: Entity> LocalGateway<E> {
  pub(crate) fn new(storage: Arc<dyn DeviceStorage>, policy: Arc<dyn IdPolicy<E>>) -> Self {
    Self { storage, policy }
  }

  fn storage_key() -> String {
    format!("dummy_{}", E::collection())
  }

  /// Read the persisted collection. An absent key reads as empty.
  fn read_collection(&self) -> Result<Vec<E>> {
    match self.storage.get(&Self::storage_key())? {
      Some(raw) => serde_json::from_str(&raw)
        .map_err(|e| eyre!("Failed to parse stored {} collection: {}", E::collection(), e)),
      None => Ok(Vec::new()),
    }
  }

  fn write_collection(&self, records: &[E]) -> Result<()> {
    let raw = serde_json::to_string(records)
      .map_err(|e| eyre!("Failed to serialize {} collection: {}", E::collection(), e))?;
    self.storage.set(&Self::storage_key(), &raw)
  }
}

impl<E: Entity> Gateway<E> for LocalGateway<E> {
  async fn fetch_all(&self) -> Result<Vec<E>> {
    self.read_collection()
  }

  async fn create(&self, mut draft: E) -> Result<E> {
    let mut records = self.read_collection()?;
    self.policy.assign(&mut draft, &records);
    records.push(draft.clone());
    self.write_collection(&records)?;
    Ok(draft)
  }

  async fn update(&self, id: i64, patch: &Patch) -> Result<()> {
    let mut records = self.read_collection()?;
    for record in &mut records {
      if record.id() == Some(id) {
        *record = merge_record(record, patch)?;
      }
    }
    self.write_collection(&records)
  }

  async fn delete(&self, id: i64) -> Result<()> {
    let mut records = self.read_collection()?;
    records.retain(|record| record.id() != Some(id));
    self.write_collection(&records)
  }
}
