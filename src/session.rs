//! Session state read from device storage: bearer token and account type.
//!
//! The mode selector lives here. It is a pure read of the `accounttype`
//! flag at call time, never cached, so flipping the flag between two store
//! operations routes each one according to the value it saw.

use std::sync::Arc;

use color_eyre::Result;

use crate::storage::DeviceStorage;

/// Storage key holding the bearer token.
const TOKEN_KEY: &str = "token";

/// Storage key holding the account type flag.
const ACCOUNT_TYPE_KEY: &str = "accounttype";

/// Account type value that selects demo (offline) mode.
const DEMO_ACCOUNT_TYPE: &str = "dummy";

/// Persistence mode for a single store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Operations go to the remote backend.
  Online,
  /// Operations go to the demo collections in device storage.
  Offline,
}

/// Shared handle on the session flags in device storage.
#[derive(Clone)]
pub struct Session {
  storage: Arc<dyn DeviceStorage>,
}

impl Session {
  pub fn new(storage: Arc<dyn DeviceStorage>) -> Self {
    Self { storage }
  }

  /// Resolve the persistence mode for the current call.
  ///
  /// An unreadable or absent flag resolves to online, matching a signed-in
  /// account with no flag set.
  pub fn mode(&self) -> Mode {
    let account_type = self.storage.get(ACCOUNT_TYPE_KEY).ok().flatten();
    match account_type.as_deref() {
      Some(DEMO_ACCOUNT_TYPE) => Mode::Offline,
      _ => Mode::Online,
    }
  }

  /// Read the bearer token, if one is stored.
  pub fn token(&self) -> Option<String> {
    self.storage.get(TOKEN_KEY).ok().flatten()
  }

  pub fn set_token(&self, token: &str) -> Result<()> {
    self.storage.set(TOKEN_KEY, token)
  }

  /// Mark the session as a demo account (offline mode) or clear the flag.
  pub fn set_demo(&self, demo: bool) -> Result<()> {
    if demo {
      self.storage.set(ACCOUNT_TYPE_KEY, DEMO_ACCOUNT_TYPE)
    } else {
      self.storage.remove(ACCOUNT_TYPE_KEY)
    }
  }

  /// Clear the token and account type, ending the session.
  pub fn clear(&self) -> Result<()> {
    self.storage.remove(TOKEN_KEY)?;
    self.storage.remove(ACCOUNT_TYPE_KEY)?;
    Ok(())
  }

  /// Access the underlying device storage.
  pub fn storage(&self) -> &Arc<dyn DeviceStorage> {
    &self.storage
  }
}
