//! Per-user store location and identity resolution.

use std::path::{Path, PathBuf};
use std::{env, fs};

use zen_core::{export_json, import_json};

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Default base directory for all companion storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".zen-companion")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve the active user id.
///
/// Priority chain:
/// 1. Explicit `--user` name
/// 2. `ZEN_USER` env
/// 3. OS login name (`USER` / `USERNAME`)
/// 4. `default_user` (the id the web frontend hardcodes)
fn resolve_user_id(explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        let sanitized = sanitize_name(name);
        if !sanitized.is_empty() {
            return sanitized;
        }
    }

    for var in ["ZEN_USER", "USER", "USERNAME"] {
        if let Ok(name) = env::var(var) {
            let sanitized = sanitize_name(&name);
            if !sanitized.is_empty() {
                return sanitized;
            }
        }
    }

    "default_user".to_string()
}

/// Sanitize a user name for use as a filename.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One store per user.
///
/// Layout:
/// ```text
/// ~/.zen-companion/
/// ├── config.toml
/// └── users/
///     ├── <user-id>.db
///     └── ...
/// ```
pub struct UserStore {
    store: Store,
    user_id: String,
}

impl UserStore {
    /// Open (creating directories as needed) the store for a user.
    /// `user`: explicit user id (overrides auto-detection).
    /// `base_dir`: override the base directory (for testing).
    pub fn open(user: Option<&str>, base_dir: Option<&Path>) -> Result<Self> {
        let base = base_dir.map(PathBuf::from).unwrap_or_else(default_base_dir);
        let users_dir = base.join("users");

        fs::create_dir_all(&users_dir).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", users_dir.display()))
        })?;

        let user_id = resolve_user_id(user);
        let store = Store::open(&users_dir.join(format!("{user_id}.db")))?;

        Ok(Self { store, user_id })
    }

    /// Open with an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
            user_id: "test".to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Serialize the whole profile (both tracks plus tasks) to JSON.
    pub fn export_profile(&self, now_unix: u64) -> Result<String> {
        let cultivation = self.store.load_cultivation();
        let realm = self.store.load_realm();
        let tasks = self.store.load_tasks();
        export_json(&cultivation, &realm, &tasks, now_unix).map_err(StoreError::from)
    }

    /// Replace the stored profile with an imported envelope.
    /// Accepts both this tool's exports and browser-era blobs.
    pub fn import_profile(&self, json: &str) -> Result<()> {
        let profile = import_json(json)
            .map_err(|e| StoreError::InvalidData(format!("unreadable profile: {e}")))?;
        self.store.save_cultivation(&profile.cultivation)?;
        self.store.save_realm(&profile.realm)?;
        self.store.save_tasks(&profile.tasks)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1771632000;

    #[test]
    fn test_explicit_user_wins() {
        assert_eq!(resolve_user_id(Some("wanderer")), "wanderer");
    }

    #[test]
    fn test_sanitization() {
        assert_eq!(sanitize_name("hello world"), "hello_world");
        assert_eq!(sanitize_name("my/user"), "my_user");
        assert_eq!(sanitize_name("valid-name_123"), "valid-name_123");
        assert_eq!(resolve_user_id(Some("a b/c")), "a_b_c");
    }

    #[test]
    fn test_empty_explicit_falls_through() {
        let id = resolve_user_id(Some(""));
        assert!(!id.is_empty());
    }

    #[test]
    fn test_directory_creation() {
        let dir = tempfile::TempDir::new().unwrap();

        let store = UserStore::open(Some("test-user"), Some(dir.path())).unwrap();
        assert_eq!(store.user_id(), "test-user");
        assert!(dir.path().join("users/test-user.db").exists());
    }

    #[test]
    fn test_users_are_isolated() {
        let dir = tempfile::TempDir::new().unwrap();

        let store_a = UserStore::open(Some("a"), Some(dir.path())).unwrap();
        let mut cultivation = store_a.store().load_cultivation();
        cultivation.record_meditation(180, NOW);
        store_a.store().save_cultivation(&cultivation).unwrap();

        let store_b = UserStore::open(Some("b"), Some(dir.path())).unwrap();
        assert_eq!(store_b.store().load_cultivation().meditation_count, 0);
        assert_eq!(store_a.store().load_cultivation().meditation_count, 1);
    }

    #[test]
    fn test_profile_export_import() {
        let source = UserStore::open_in_memory().unwrap();
        let mut cultivation = source.store().load_cultivation();
        cultivation.record_meditation(180, NOW);
        cultivation.add_journal("今日静坐", NOW);
        source.store().save_cultivation(&cultivation).unwrap();

        let json = source.export_profile(NOW).unwrap();

        let target = UserStore::open_in_memory().unwrap();
        target.import_profile(&json).unwrap();
        assert_eq!(target.store().load_cultivation(), cultivation);
    }

    #[test]
    fn test_import_rejects_garbage() {
        let store = UserStore::open_in_memory().unwrap();
        assert!(store.import_profile("not json").is_err());
    }

    #[test]
    fn test_import_browser_blob() {
        let store = UserStore::open_in_memory().unwrap();
        store
            .import_profile(r#"{"zenUserData": {"meditationCount": 9}, "zenProgress": {"level": 2, "exp": 100}}"#)
            .unwrap();
        assert_eq!(store.store().load_cultivation().meditation_count, 9);
        assert_eq!(store.store().load_realm().level, 2);
    }
}
