//! Persistence backends for the session store.
//!
//! A session survives restarts as two independent slots: the bearer token
//! in the OS keychain and the identity snapshot in a JSON file. The two
//! are only ever meaningful together, so `load` returns a session when
//! both are present and clears stray halves otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::User;

/// Keychain service name for the stored bearer token
const SERVICE_NAME: &str = "techflow";

/// Keychain account under which the token is stored
const TOKEN_ACCOUNT: &str = "session-token";

/// Identity snapshot file name inside the data directory
const IDENTITY_FILE: &str = "identity.json";

/// A restorable session: credential, identity, and when it was saved.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSession {
    pub token: String,
    pub user: User,
    pub saved_at: DateTime<Utc>,
}

/// Storage backend the session store writes through.
///
/// The production backend is `KeychainStorage`; tests inject an in-memory
/// one so every state transition is observable without touching the OS.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>>;
    fn store(&self, session: &PersistedSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// On-disk half of the persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentityRecord {
    user: User,
    saved_at: DateTime<Utc>,
}

fn read_identity(path: &Path) -> Result<Option<IdentityRecord>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).context("Failed to read identity file")?;
    let record: IdentityRecord =
        serde_json::from_str(&contents).context("Failed to parse identity file")?;
    Ok(Some(record))
}

fn write_identity(path: &Path, record: &IdentityRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create data directory")?;
    }
    let contents = serde_json::to_string_pretty(record)?;
    std::fs::write(path, contents).context("Failed to write identity file")?;
    Ok(())
}

/// Token in the OS keychain, identity snapshot on disk.
pub struct KeychainStorage {
    identity_path: PathBuf,
}

impl KeychainStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            identity_path: data_dir.join(IDENTITY_FILE),
        }
    }

    fn token_entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, TOKEN_ACCOUNT).context("Failed to create keyring entry")
    }

    fn load_token() -> Result<Option<String>> {
        match Self::token_entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn clear_token() -> Result<()> {
        match Self::token_entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }

    fn clear_identity(&self) -> Result<()> {
        if self.identity_path.exists() {
            std::fs::remove_file(&self.identity_path).context("Failed to remove identity file")?;
        }
        Ok(())
    }
}

impl SessionStorage for KeychainStorage {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let token = Self::load_token()?;
        let record = read_identity(&self.identity_path)?;

        match (token, record) {
            (Some(token), Some(record)) => Ok(Some(PersistedSession {
                token,
                user: record.user,
                saved_at: record.saved_at,
            })),
            (None, None) => Ok(None),
            // One slot without the other is a broken session; drop the
            // stray half so the next load starts clean.
            (token, record) => {
                warn!(
                    has_token = token.is_some(),
                    has_identity = record.is_some(),
                    "Partial persisted session, clearing"
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn store(&self, session: &PersistedSession) -> Result<()> {
        write_identity(
            &self.identity_path,
            &IdentityRecord {
                user: session.user.clone(),
                saved_at: session.saved_at,
            },
        )?;
        Self::token_entry()?
            .set_password(&session.token)
            .context("Failed to store token in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        // Attempt both slots even if the first fails
        let token_result = Self::clear_token();
        let identity_result = self.clear_identity();
        token_result?;
        identity_result
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// In-memory backend for session-store tests. `fail_load` simulates
    /// corrupted persisted state.
    #[derive(Default)]
    pub(crate) struct MemoryStorage {
        pub slot: Mutex<Option<PersistedSession>>,
        pub fail_load: bool,
    }

    impl MemoryStorage {
        pub fn with_session(session: PersistedSession) -> Self {
            Self {
                slot: Mutex::new(Some(session)),
                fail_load: false,
            }
        }

        pub fn corrupted() -> Self {
            Self {
                slot: Mutex::new(None),
                fail_load: true,
            }
        }
    }

    impl SessionStorage for MemoryStorage {
        fn load(&self) -> Result<Option<PersistedSession>> {
            if self.fail_load {
                anyhow::bail!("corrupted persisted session");
            }
            Ok(self.slot.lock().unwrap().clone())
        }

        fn store(&self, session: &PersistedSession) -> Result<()> {
            *self.slot.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }
}
