//! Whole-profile JSON envelope for moving data between machines.
//!
//! The envelope carries a version stamp; the records inside accept the
//! browser app's field names, so a profile assembled from its local-storage
//! blobs imports with no conversion step.

use serde::{Deserialize, Serialize};

use crate::cultivation::CultivationRecord;
use crate::planner::Task;
use crate::realm::RealmRecord;
use crate::time::unix_to_iso8601;

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileExport {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, alias = "zenUserData")]
    pub cultivation: CultivationRecord,
    #[serde(default, alias = "zenProgress")]
    pub realm: RealmRecord,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

fn default_version() -> u32 {
    EXPORT_VERSION
}

/// Serialize a full profile to pretty JSON.
pub fn export_json(
    cultivation: &CultivationRecord,
    realm: &RealmRecord,
    tasks: &[Task],
    now_unix: u64,
) -> Result<String, serde_json::Error> {
    let envelope = ProfileExport {
        version: EXPORT_VERSION,
        timestamp: unix_to_iso8601(now_unix),
        cultivation: cultivation.clone(),
        realm: realm.clone(),
        tasks: tasks.to_vec(),
    };
    serde_json::to_string_pretty(&envelope)
}

/// Deserialize a profile envelope.
pub fn import_json(json: &str) -> Result<ProfileExport, serde_json::Error> {
    serde_json::from_str(json)
}
