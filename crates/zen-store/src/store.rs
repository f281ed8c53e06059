//! SQLite-backed document store: one JSON record per namespace.
//!
//! The contract mirrors the web frontend's local-storage use: loads never
//! fail (absent or malformed data reads as the namespace default), saves
//! overwrite the whole record.

use std::path::Path;

use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use zen_core::{ChatUsage, CultivationRecord, RealmRecord, Task, now_iso8601};

use crate::error::Result;
use crate::schema;

pub const NS_CULTIVATION: &str = "cultivation";
pub const NS_REALM: &str = "realm";
pub const NS_TASKS: &str = "tasks";
pub const NS_CHAT_USAGE: &str = "chat_usage";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Raw namespace access ---

    pub fn load_raw(&self, namespace: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM records WHERE namespace = ?1")?;
        let result = stmt.query_row([namespace], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn save_raw(&self, namespace: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO records (namespace, value, updated_at) VALUES (?1, ?2, ?3)",
            params![namespace, value, now_iso8601()],
        )?;
        Ok(())
    }

    // --- Typed records ---

    /// Absent, unreadable, or malformed data reads as the default record.
    /// A malformed record is logged and then treated exactly like absence.
    fn load_or_default<T: DeserializeOwned + Default>(&self, namespace: &str) -> T {
        let raw = match self.load_raw(namespace) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("failed to read '{namespace}' record, using defaults: {e}");
                return T::default();
            }
        };
        match raw {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("malformed '{namespace}' record, using defaults: {e}");
                T::default()
            }),
            None => T::default(),
        }
    }

    fn save_record<T: Serialize>(&self, namespace: &str, record: &T) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.save_raw(namespace, &json)
    }

    pub fn load_cultivation(&self) -> CultivationRecord {
        self.load_or_default(NS_CULTIVATION)
    }

    pub fn save_cultivation(&self, record: &CultivationRecord) -> Result<()> {
        self.save_record(NS_CULTIVATION, record)
    }

    pub fn load_realm(&self) -> RealmRecord {
        self.load_or_default(NS_REALM)
    }

    pub fn save_realm(&self, record: &RealmRecord) -> Result<()> {
        self.save_record(NS_REALM, record)
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        self.load_or_default(NS_TASKS)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.save_record(NS_TASKS, &tasks)
    }

    pub fn load_chat_usage(&self) -> ChatUsage {
        self.load_or_default(NS_CHAT_USAGE)
    }

    pub fn save_chat_usage(&self, usage: &ChatUsage) -> Result<()> {
        self.save_record(NS_CHAT_USAGE, usage)
    }
}
