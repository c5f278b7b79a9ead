//! Generic record store: a fetch-once cache in front of a mode-selected
//! gateway.

use color_eyre::{eyre::eyre, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::error;
use url::Url;

use crate::session::{Mode, Session};

use super::gateway::{ActiveGateway, Gateway};
use super::local::LocalGateway;
use super::remote::RemoteGateway;
use super::traits::{merge_record, Entity, IdPolicy, Patch};

/// Shared collaborators handed to every store at construction: the session
/// flags, the backend base URL and one HTTP client reused across stores.
#[derive(Clone)]
pub struct Context {
  session: Session,
  base_url: Url,
  http: reqwest::Client,
}

impl Context {
  pub fn new(session: Session, base_url: &str) -> Result<Self> {
    let base_url =
      Url::parse(base_url).map_err(|e| eyre!("Invalid backend URL {}: {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      session,
      base_url,
      http,
    })
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub(crate) fn http(&self) -> &reqwest::Client {
    &self.http
  }

  pub(crate) fn base_url(&self) -> &Url {
    &self.base_url
  }
}

struct CacheState<E> {
  records: Vec<E>,
  fetched: bool,
}

/// In-memory ordered cache plus the gateways serving it.
///
/// Every operation re-resolves the persistence mode, performs exactly one
/// gateway call and then applies exactly one cache mutation, in that order.
/// The cache is never touched before the gateway confirms; in demo mode the
/// gateway write is the synchronous local write itself.
pub struct Store<E: Entity> {
  session: Session,
  remote: RemoteGateway<E>,
  local: LocalGateway<E>,
  cache: Mutex<CacheState<E>>,
}

impl<E: Entity> Store<E> {
  pub fn new(ctx: &Context, policy: Arc<dyn IdPolicy<E>>) -> Self {
    Self {
      session: ctx.session.clone(),
      remote: RemoteGateway::new(ctx.http.clone(), ctx.base_url.clone(), ctx.session.clone()),
      local: LocalGateway::new(ctx.session.storage().clone(), policy),
      cache: Mutex::new(CacheState {
        records: Vec::new(),
        fetched: false,
      }),
    }
  }

  /// Select the gateway for one call. Never cached, so a mode change between
  /// calls is honored per call.
  fn gateway(&self) -> ActiveGateway<'_, E> {
    match self.session.mode() {
      Mode::Online => ActiveGateway::Remote(&self.remote),
      Mode::Offline => ActiveGateway::Local(&self.local),
    }
  }

  // No operation panics while holding the lock, so a poisoned cache is
  // still consistent.
  fn cache(&self) -> MutexGuard<'_, CacheState<E>> {
    self.cache.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Retrieve the full collection into the cache, once.
  ///
  /// A no-op after the first success. A gateway failure is reported to
  /// tracing only; `fetched` stays false so a later call retries.
  pub async fn fetch_all(&self) -> Result<()> {
    if self.cache().fetched {
      return Ok(());
    }

    match self.gateway().fetch_all().await {
      Ok(records) => {
        let mut cache = self.cache();
        cache.records = records;
        cache.fetched = true;
      }
      Err(err) => {
        error!("Failed to fetch {}: {:#}", E::collection(), err);
      }
    }

    Ok(())
  }

  /// Persist a new record and append the canonical result to the cache.
  ///
  /// The identifier is assigned by the gateway (server online, identifier
  /// policy in demo mode), never by the caller.
  pub async fn add(&self, draft: E) -> Result<E> {
    let created = match self.gateway().create(draft).await {
      Ok(record) => record,
      Err(err) => {
        error!("Failed to add {} record: {:#}", E::collection(), err);
        return Err(err);
      }
    };

    self.cache().records.push(created.clone());
    Ok(created)
  }

  /// Persist a partial update and shallow-merge it over the cached record.
  ///
  /// An id missing from the cache is not an error: the write has already
  /// succeeded, the local view simply will not reflect it.
  pub async fn update(&self, id: i64, patch: Patch) -> Result<()> {
    if let Err(err) = self.gateway().update(id, &patch).await {
      error!("Failed to update {} record {}: {:#}", E::collection(), id, err);
      return Err(err);
    }

    let mut cache = self.cache();
    if let Some(record) = cache.records.iter_mut().find(|r| r.id() == Some(id)) {
      *record = merge_record(record, &patch)?;
    }

    Ok(())
  }

  /// Remove a record from the backing store and the cache. No-op if absent.
  pub async fn delete(&self, id: i64) -> Result<()> {
    if let Err(err) = self.gateway().delete(id).await {
      error!("Failed to delete {} record {}: {:#}", E::collection(), id, err);
      return Err(err);
    }

    self.cache().records.retain(|r| r.id() != Some(id));
    Ok(())
  }

  /// Snapshot of the cached records, in insertion order.
  pub fn records(&self) -> Vec<E> {
    self.cache().records.clone()
  }

  /// Look up a cached record by id.
  pub fn get(&self, id: i64) -> Option<E> {
    self.cache().records.iter().find(|r| r.id() == Some(id)).cloned()
  }

  pub fn is_fetched(&self) -> bool {
    self.cache().fetched
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::{DeviceStorage, MemoryStorage};
  use crate::sync::TimestampId;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Widget {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    #[serde(default)]
    qty: i64,
  }

  impl Entity for Widget {
    fn collection() -> &'static str {
      "widgets"
    }

    fn id(&self) -> Option<i64> {
      self.id
    }

    fn set_id(&mut self, id: i64) {
      self.id = Some(id);
    }
  }

  fn widget(name: &str) -> Widget {
    Widget {
      id: None,
      name: name.to_string(),
      qty: 0,
    }
  }

  fn patch(raw: &str) -> Patch {
    serde_json::from_str(raw).unwrap()
  }

  /// Demo-mode store over in-memory device storage. The backend URL points
  /// at a closed port so an accidental online call fails instead of
  /// silently succeeding.
  fn demo_store() -> (Store<Widget>, Arc<MemoryStorage>, Session) {
    let storage = Arc::new(MemoryStorage::new());
    let session = Session::new(storage.clone());
    session.set_demo(true).unwrap();
    let ctx = Context::new(session.clone(), "http://127.0.0.1:1").unwrap();
    (Store::new(&ctx, Arc::new(TimestampId)), storage, session)
  }

  fn stored_blob(storage: &MemoryStorage) -> String {
    storage.get("dummy_widgets").unwrap().unwrap()
  }

  #[tokio::test]
  async fn test_fetch_all_is_guarded() {
    let (store, storage, _session) = demo_store();
    storage
      .set("dummy_widgets", r#"[{"_id": 1, "name": "bolt", "qty": 2}]"#)
      .unwrap();

    store.fetch_all().await.unwrap();
    assert!(store.is_fetched());
    assert_eq!(store.records().len(), 1);

    // A second call must not re-read the backing store.
    storage.set("dummy_widgets", "[]").unwrap();
    store.fetch_all().await.unwrap();
    assert_eq!(store.records().len(), 1);
  }

  #[tokio::test]
  async fn test_fetch_failure_leaves_fetched_false() {
    let (store, _storage, session) = demo_store();
    session.set_demo(false).unwrap();

    // Online against a closed port: reported to tracing, not to the caller.
    store.fetch_all().await.unwrap();
    assert!(!store.is_fetched());
    assert!(store.records().is_empty());

    // Back in demo mode the retry succeeds and latches the guard.
    session.set_demo(true).unwrap();
    store.fetch_all().await.unwrap();
    assert!(store.is_fetched());
  }

  #[tokio::test]
  async fn test_add_assigns_id_and_appends() {
    let (store, storage, _session) = demo_store();
    store.fetch_all().await.unwrap();

    let first = store.add(widget("bolt")).await.unwrap();
    let second = store.add(widget("nut")).await.unwrap();

    assert!(first.id.is_some());
    assert!(second.id.is_some());

    let records = store.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "bolt");
    assert_eq!(records[1].name, "nut");

    // The persisted blob reflects the latest mutation.
    let persisted: Vec<Widget> = serde_json::from_str(&stored_blob(&storage)).unwrap();
    assert_eq!(persisted, records);
  }

  #[tokio::test]
  async fn test_update_merges_and_retains_other_fields() {
    let (store, storage, _session) = demo_store();
    let created = store
      .add(Widget {
        id: None,
        name: "bolt".to_string(),
        qty: 7,
      })
      .await
      .unwrap();
    let id = created.id.unwrap();

    store.update(id, patch(r#"{"name": "nut"}"#)).await.unwrap();

    let cached = store.get(id).unwrap();
    assert_eq!(cached.name, "nut");
    assert_eq!(cached.qty, 7);

    let persisted: Vec<Widget> = serde_json::from_str(&stored_blob(&storage)).unwrap();
    assert_eq!(persisted, vec![cached]);
  }

  #[tokio::test]
  async fn test_update_absent_id_is_a_no_op() {
    let (store, _storage, _session) = demo_store();
    store.add(widget("bolt")).await.unwrap();

    let before = store.records();
    store.update(999, patch(r#"{"name": "nut"}"#)).await.unwrap();
    assert_eq!(store.records(), before);
  }

  #[tokio::test]
  async fn test_delete_removes_by_id() {
    let (store, _storage, _session) = demo_store();
    let first = store.add(widget("bolt")).await.unwrap();
    let second = store.add(widget("nut")).await.unwrap();

    store.delete(first.id.unwrap()).await.unwrap();

    assert_eq!(store.get(first.id.unwrap()), None);
    assert_eq!(store.records().len(), 1);

    // Deleting an absent id changes nothing.
    store.delete(first.id.unwrap()).await.unwrap();
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].id, second.id);
  }

  #[tokio::test]
  async fn test_demo_lifecycle_roundtrip() {
    let (store, storage, _session) = demo_store();

    let created = store.add(widget("Acme")).await.unwrap();
    let id = created.id.unwrap();
    assert_eq!(store.records()[0].name, "Acme");

    store.update(id, patch(r#"{"name": "Acme Inc"}"#)).await.unwrap();
    assert_eq!(store.records()[0].name, "Acme Inc");

    store.delete(id).await.unwrap();
    assert!(store.records().is_empty());
    assert_eq!(stored_blob(&storage), "[]");
  }

  #[tokio::test]
  async fn test_mode_is_resolved_per_call() {
    let (store, _storage, session) = demo_store();
    store.add(widget("bolt")).await.unwrap();

    // Flip to online mid-lifetime: the next call goes to the (closed)
    // backend and fails without touching the cache.
    session.set_demo(false).unwrap();
    assert!(store.add(widget("nut")).await.is_err());
    assert_eq!(store.records().len(), 1);

    // Flip back: the same store serves demo writes again.
    session.set_demo(true).unwrap();
    store.add(widget("nut")).await.unwrap();
    assert_eq!(store.records().len(), 2);
  }

  #[tokio::test]
  async fn test_mutation_failure_skips_cache_mutation() {
    let (store, _storage, session) = demo_store();
    let created = store.add(widget("bolt")).await.unwrap();
    let id = created.id.unwrap();

    session.set_demo(false).unwrap();
    assert!(store.update(id, patch(r#"{"name": "nut"}"#)).await.is_err());
    assert!(store.delete(id).await.is_err());

    assert_eq!(store.get(id).unwrap().name, "bolt");
  }

  #[tokio::test]
  async fn test_malformed_blob_fails_fetch_but_allows_retry() {
    let (store, storage, _session) = demo_store();
    storage.set("dummy_widgets", "not json").unwrap();

    store.fetch_all().await.unwrap();
    assert!(!store.is_fetched());

    storage.set("dummy_widgets", "[]").unwrap();
    store.fetch_all().await.unwrap();
    assert!(store.is_fetched());
  }
}
