// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session token persistence.
//!
//! The server issues and validates tokens; the client only stores one and
//! replays it. Storage goes through [`KeyValueStore`] so the session logic
//! can be exercised against [`MemoryStore`] in tests and [`FileStore`] on
//! disk.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::api::{ApiClient, ApiError, AuthResponse, RegisterRequest};
use crate::config::APP_NAME;

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "authToken";
/// Storage key for the signed-in e-mail address.
pub const EMAIL_KEY: &str = "authEmail";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Rejected(String),

    #[error("session storage error: {0}")]
    Storage(#[from] io::Error),

    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("not signed in")]
    NotSignedIn,
}

/// Persistent string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), AuthError>;
    fn remove(&mut self, key: &str) -> Result<(), AuthError>;
}

/// In-memory store.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), AuthError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object in a file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    /// Open the store at `path`, starting empty if the file is unreadable JSON.
    ///
    /// The corrupt file is rewritten as an empty session straight away.
    pub fn open_or_reset(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let path = path.into();
        match Self::open(&path) {
            Err(AuthError::Corrupt(e)) => {
                warn!("Resetting corrupt session file {}: {}", path.display(), e);
                let store = Self {
                    path,
                    entries: HashMap::new(),
                };
                if let Err(e) = store.flush() {
                    warn!("Could not rewrite session file: {}", e);
                }
                Ok(store)
            }
            other => other,
        }
    }

    /// Default session file in the user's data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".local"))
            .join(APP_NAME)
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), AuthError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// The signed-in user as far as the client knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub token: String,
    pub email: Option<String>,
}

/// Token-store-and-attach session.
#[derive(Debug)]
pub struct AuthSession<S> {
    store: S,
    current: Option<CurrentUser>,
}

impl<S: KeyValueStore> AuthSession<S> {
    /// Restore any previously stored session.
    pub fn restore(store: S) -> Self {
        let current = store.get(TOKEN_KEY).map(|token| CurrentUser {
            token,
            email: store.get(EMAIL_KEY),
        });
        if current.is_some() {
            debug!("Restored stored session");
        }
        Self { store, current }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|u| u.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// E-mail of the signed-in user, required for per-user endpoints.
    pub fn email(&self) -> Result<&str, AuthError> {
        self.current
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .ok_or(AuthError::NotSignedIn)
    }

    /// Record a server response, storing the token when one was issued.
    ///
    /// Returns whether the session is now signed in.
    pub fn accept(&mut self, response: &AuthResponse) -> Result<bool, AuthError> {
        let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(false);
        };

        self.store.set(TOKEN_KEY, token)?;
        match &response.email {
            Some(email) => self.store.set(EMAIL_KEY, email)?,
            None => self.store.remove(EMAIL_KEY)?,
        }
        self.current = Some(CurrentUser {
            token: token.to_string(),
            email: response.email.clone(),
        });
        Ok(true)
    }

    /// Sign in. A response without a token is a failure carrying the server's message.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        let response = api.login(email, password).await?;
        if !self.accept(&response)? {
            return Err(AuthError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Login failed".to_string()),
            ));
        }
        info!("Signed in as {}", email);
        Ok(response)
    }

    /// Register. The response is returned whether or not a token was issued.
    pub async fn register(
        &mut self,
        api: &ApiClient,
        request: &RegisterRequest,
    ) -> Result<AuthResponse, AuthError> {
        let response = api.register(request).await?;
        if self.accept(&response)? {
            info!("Registered and signed in as {}", request.email);
        }
        Ok(response)
    }

    /// Forget the stored session.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(EMAIL_KEY)?;
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued(token: &str) -> AuthResponse {
        AuthResponse {
            token: Some(token.to_string()),
            email: Some("pax@example.com".to_string()),
            message: None,
        }
    }

    #[test]
    fn test_restore_empty_store() {
        let session = AuthSession::restore(MemoryStore::default());
        assert!(!session.is_authenticated());
        assert!(matches!(session.email(), Err(AuthError::NotSignedIn)));
    }

    #[test]
    fn test_accept_token_and_restore() {
        let mut session = AuthSession::restore(MemoryStore::default());
        assert!(session.accept(&issued("tok-1")).unwrap());
        assert_eq!(session.token(), Some("tok-1"));

        let restored = AuthSession::restore(session.store.clone());
        assert_eq!(restored.token(), Some("tok-1"));
        assert_eq!(restored.email().unwrap(), "pax@example.com");
    }

    #[test]
    fn test_response_without_token_is_not_stored() {
        let mut session = AuthSession::restore(MemoryStore::default());
        let rejected = AuthResponse {
            message: Some("User already exists".to_string()),
            ..Default::default()
        };
        assert!(!session.accept(&rejected).unwrap());
        assert!(!session.is_authenticated());
        assert!(session.store.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_logout_clears_store() {
        let mut session = AuthSession::restore(MemoryStore::default());
        session.accept(&issued("tok-1")).unwrap();
        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.store.get(TOKEN_KEY).is_none());
        assert!(session.store.get(EMAIL_KEY).is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
        store.set(TOKEN_KEY, "tok-2").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("tok-2"));

        let mut reopened = reopened;
        reopened.remove(TOKEN_KEY).unwrap();
        assert!(FileStore::open(&path).unwrap().get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_corrupt_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(AuthError::Corrupt(_))));
    }

    #[test]
    fn test_corrupt_session_file_is_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let mut session = AuthSession::restore(FileStore::open_or_reset(&path).unwrap());
        assert!(!session.is_authenticated());
        assert!(FileStore::open(&path).unwrap().get(TOKEN_KEY).is_none());

        session.logout().unwrap();
        session.accept(&issued("tok-3")).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("tok-3"));
    }
}
