//! Durable storage for the access/refresh token pair.
//!
//! Pure storage — no validation happens here. The pair is always written
//! and cleared together; a refresh token must never outlive a logout.

use std::{
  fs, io,
  path::PathBuf,
  sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

/// Opaque storage for the token pair.
pub trait TokenStore: Send + Sync {
  /// Store both tokens, replacing whatever was there.
  fn set_tokens(&self, access: &str, refresh: &str) -> io::Result<()>;

  fn access_token(&self) -> io::Result<Option<String>>;

  fn refresh_token(&self) -> io::Result<Option<String>>;

  /// Remove both tokens.
  fn clear(&self) -> io::Result<()>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
  fn set_tokens(&self, access: &str, refresh: &str) -> io::Result<()> {
    (**self).set_tokens(access, refresh)
  }

  fn access_token(&self) -> io::Result<Option<String>> {
    (**self).access_token()
  }

  fn refresh_token(&self) -> io::Result<Option<String>> {
    (**self).refresh_token()
  }

  fn clear(&self) -> io::Result<()> {
    (**self).clear()
  }
}

// ─── File-backed store ───────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
  access_token:  String,
  refresh_token: String,
}

/// Token pair persisted as a small TOML file. Survives restarts; the file
/// is deleted on [`TokenStore::clear`].
#[derive(Debug, Clone)]
pub struct FileTokenStore {
  path: PathBuf,
}

impl FileTokenStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &std::path::Path {
    &self.path
  }

  fn read(&self) -> io::Result<Option<StoredTokens>> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e),
    };
    match toml::from_str(&raw) {
      Ok(stored) => Ok(Some(stored)),
      Err(e) => {
        // A corrupt token file is the same as no tokens; the next login
        // overwrites it.
        tracing::warn!("unreadable token file {:?}: {e}", self.path);
        Ok(None)
      }
    }
  }
}

impl TokenStore for FileTokenStore {
  fn set_tokens(&self, access: &str, refresh: &str) -> io::Result<()> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    let stored = StoredTokens {
      access_token:  access.to_string(),
      refresh_token: refresh.to_string(),
    };
    let raw = toml::to_string(&stored)
      .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&self.path, raw)
  }

  fn access_token(&self) -> io::Result<Option<String>> {
    Ok(self.read()?.map(|t| t.access_token))
  }

  fn refresh_token(&self) -> io::Result<Option<String>> {
    Ok(self.read()?.map(|t| t.refresh_token))
  }

  fn clear(&self) -> io::Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e),
    }
  }
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// Process-local store used by the tests (and handy for ephemeral
/// sessions that should not touch disk).
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
  inner: Mutex<Option<(String, String)>>,
}

impl MemoryTokenStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl TokenStore for MemoryTokenStore {
  fn set_tokens(&self, access: &str, refresh: &str) -> io::Result<()> {
    *self.inner.lock().unwrap() =
      Some((access.to_string(), refresh.to_string()));
    Ok(())
  }

  fn access_token(&self) -> io::Result<Option<String>> {
    Ok(self.inner.lock().unwrap().as_ref().map(|(a, _)| a.clone()))
  }

  fn refresh_token(&self) -> io::Result<Option<String>> {
    Ok(self.inner.lock().unwrap().as_ref().map(|(_, r)| r.clone()))
  }

  fn clear(&self) -> io::Result<()> {
    *self.inner.lock().unwrap() = None;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scratch_store() -> FileTokenStore {
    let path = std::env::temp_dir()
      .join(format!("wardbook-tokens-{}.toml", uuid::Uuid::new_v4()));
    FileTokenStore::new(path)
  }

  #[test]
  fn file_store_round_trips_the_pair() {
    let store = scratch_store();
    store.set_tokens("access-abc", "refresh-xyz").unwrap();

    assert_eq!(store.access_token().unwrap().as_deref(), Some("access-abc"));
    assert_eq!(
      store.refresh_token().unwrap().as_deref(),
      Some("refresh-xyz")
    );

    store.clear().unwrap();
    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(store.refresh_token().unwrap(), None);
    // Clearing an already-clear store is fine.
    store.clear().unwrap();
  }

  #[test]
  fn missing_file_reads_as_no_tokens() {
    let store = scratch_store();
    assert_eq!(store.access_token().unwrap(), None);
  }

  #[test]
  fn corrupt_file_reads_as_no_tokens() {
    let store = scratch_store();
    std::fs::write(store.path(), "not [valid toml").unwrap();
    assert_eq!(store.access_token().unwrap(), None);
    store.clear().unwrap();
  }

  #[test]
  fn memory_store_round_trips_the_pair() {
    let store = MemoryTokenStore::new();
    store.set_tokens("a", "r").unwrap();
    assert_eq!(store.access_token().unwrap().as_deref(), Some("a"));
    store.clear().unwrap();
    assert_eq!(store.refresh_token().unwrap(), None);
  }
}
