//! Activity feed: recent events recorded against other collections.
//!
//! Deliberately not a [`Store`](crate::sync::Store) instantiation: entries
//! have string ids, the feed is remote-only (demo accounts have none), every
//! fetch refreshes, and new entries go to the front.

use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::error;
use url::Url;

use crate::session::Session;
use crate::sync::Context;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub title: String,
  pub detail: String,
  pub link: String,
  pub created_at: String,
}

pub struct ActivityFeed {
  http: Client,
  base_url: Url,
  session: Session,
  cache: Mutex<Vec<Activity>>,
}

impl ActivityFeed {
  pub(crate) fn new(ctx: &Context) -> Self {
    Self {
      http: ctx.http().clone(),
      base_url: ctx.base_url().clone(),
      session: ctx.session().clone(),
      cache: Mutex::new(Vec::new()),
    }
  }

  fn cache(&self) -> MutexGuard<'_, Vec<Activity>> {
    self.cache.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
    match self.session.token() {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  /// Refresh the feed. No fetch guard: every call re-reads the backend.
  /// Failures are reported to tracing only.
  pub async fn fetch_all(&self) -> Result<()> {
    let url = self
      .base_url
      .join("api/activities")
      .map_err(|e| eyre!("Invalid activities endpoint: {}", e))?;

    let fetched: Result<Vec<Activity>> = async {
      let response = self
        .authorized(self.http.get(url))
        .send()
        .await
        .map_err(|e| eyre!("Failed to fetch activities: {}", e))?
        .error_for_status()
        .map_err(|e| eyre!("Failed to fetch activities: {}", e))?;

      response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse activities response: {}", e))
    }
    .await;

    match fetched {
      Ok(activities) => *self.cache() = activities,
      Err(err) => error!("{:#}", err),
    }

    Ok(())
  }

  /// Record a new entry at the front of the feed (newest first). Entries
  /// are written by the backend as a side effect of other operations, so
  /// this touches the local feed only.
  pub fn record(&self, activity: Activity) {
    self.cache().insert(0, activity);
  }

  /// Remove an entry from the backend and the feed.
  pub async fn remove(&self, id: &str) -> Result<()> {
    let url = self
      .base_url
      .join(&format!("api/activities/delete/{}", id))
      .map_err(|e| eyre!("Invalid activities endpoint: {}", e))?;

    self
      .authorized(self.http.delete(url))
      .send()
      .await
      .map_err(|e| eyre!("Failed to delete activity {}: {}", id, e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to delete activity {}: {}", id, e))?;

    self.cache().retain(|a| a.id != id);
    Ok(())
  }

  /// Snapshot of the feed, newest first.
  pub fn activities(&self) -> Vec<Activity> {
    self.cache().clone()
  }
}
