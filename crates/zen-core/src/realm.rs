//! Realm progression: an experience track whose levels map onto named realms.

use serde::{Deserialize, Serialize};

use crate::constants::EXP_PER_LEVEL_UNIT;

/// A named tier of progression covering a contiguous level range.
#[derive(Debug)]
pub struct Realm {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub min_level: u32,
    pub max_level: u32,
}

/// Ordered, non-overlapping realm table.
pub const REALMS: [Realm; 4] = [
    Realm {
        key: "initial",
        name: "初心",
        description: "万法归一，一归何处？",
        min_level: 1,
        max_level: 5,
    },
    Realm {
        key: "aware",
        name: "明心",
        description: "心似明镜台，时时勤拂拭。",
        min_level: 6,
        max_level: 15,
    },
    Realm {
        key: "enlightened",
        name: "见性",
        description: "菩提本无树，明镜亦非台。",
        min_level: 16,
        max_level: 30,
    },
    Realm {
        key: "mastery",
        name: "明道",
        description: "青山绿水，尽是真如。",
        min_level: 31,
        max_level: 50,
    },
];

/// Realm for a level. Levels past the table clamp to the last realm so the
/// display never goes blank beyond 明道.
pub fn realm_for(level: u32) -> &'static Realm {
    REALMS
        .iter()
        .find(|r| level >= r.min_level && level <= r.max_level)
        .unwrap_or(&REALMS[REALMS.len() - 1])
}

/// Experience required to advance out of `level`.
pub fn exp_for_next_level(level: u32) -> u64 {
    level as u64 * EXP_PER_LEVEL_UNIT
}

/// Payload for the realm level-up modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RealmLevelUp {
    pub new_level: u32,
    pub realm_name: &'static str,
}

/// The singleton realm profile: a level and the experience within it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealmRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub exp: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_level() -> u32 {
    1
}

impl Default for RealmRecord {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            level: 1,
            exp: 0,
        }
    }
}

impl RealmRecord {
    /// Add experience, advancing at most one level per call.
    ///
    /// The threshold check runs once per grant, not in a loop: a grant
    /// spanning two thresholds advances one level and carries the surplus
    /// into the next grant.
    pub fn add_experience(&mut self, amount: u64) -> Option<RealmLevelUp> {
        self.exp += amount;
        let threshold = exp_for_next_level(self.level);
        if self.exp >= threshold {
            self.exp -= threshold;
            self.level += 1;
            Some(RealmLevelUp {
                new_level: self.level,
                realm_name: realm_for(self.level).name,
            })
        } else {
            None
        }
    }

    pub fn realm(&self) -> &'static Realm {
        realm_for(self.level)
    }

    /// Experience still needed before the next level.
    pub fn exp_to_next(&self) -> u64 {
        exp_for_next_level(self.level).saturating_sub(self.exp)
    }

    /// Percentage of the way through the current level, for the progress ring.
    pub fn progress_percentage(&self) -> f64 {
        (self.exp as f64 / exp_for_next_level(self.level) as f64) * 100.0
    }
}
