//! Integration tests exercising both progression tracks end to end, plus
//! property tests for the arithmetic laws.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use zen_core::{
    CultivationRecord, MEDITATION_EXP, RealmRecord, exp_for_next_level, export_json, import_json,
    master_reply, realm_for,
};

// 2026-02-21T08:00:00Z
const NOW: u64 = 1771632000 + 8 * 3600;
const DAY: u64 = 86400;

/// Ten sessions on ten distinct days: level 2, progress reset, streak 10.
#[test]
fn ten_daily_sessions_reach_level_two() {
    let mut record = CultivationRecord::default();
    for i in 0..10 {
        record.record_meditation(180, NOW + i * DAY);
    }
    assert_eq!(record.meditation_count, 10);
    assert_eq!(record.level, 2);
    assert_eq!(record.progress, 0);
    assert_eq!(record.streak_days, 10);
}

/// Fresh realm track: 1000 exp is exactly one level, landing still in 初心.
#[test]
fn first_realm_level_up_stays_in_initial_realm() {
    let mut realm = RealmRecord::default();
    let up = realm.add_experience(1000).expect("should level up");
    assert_eq!(realm.level, 2);
    assert_eq!(realm.exp, 0);
    assert_eq!(up.new_level, 2);
    assert_eq!(up.realm_name, "初心");
}

/// A full practice day as the session layer drives it: one meditation feeds
/// both tracks.
#[test]
fn one_session_advances_both_tracks() {
    let mut cultivation = CultivationRecord::default();
    let mut realm = RealmRecord::default();

    for i in 0..20 {
        cultivation.record_meditation(180, NOW + i * DAY);
        realm.add_experience(MEDITATION_EXP);
    }

    assert_eq!(cultivation.level, 3);
    assert_eq!(realm.level, 2);
    assert_eq!(realm.exp, 0);
    assert_eq!(realm.realm().name, "初心");
}

/// Chats cap the wisdom log at ten while the counter keeps going.
#[test]
fn wisdom_log_caps_while_count_grows() {
    let mut record = CultivationRecord::default();
    let mut rng = SmallRng::seed_from_u64(42);
    for i in 0..25 {
        let reply = master_reply("何为禅？", &mut rng);
        record.record_chat(&reply, NOW + i);
    }
    assert_eq!(record.chat_count, 25);
    assert_eq!(record.wisdom_quotes.len(), 10);
}

/// Export, reimport, export again: byte-identical.
#[test]
fn export_import_is_idempotent() {
    let mut cultivation = CultivationRecord::default();
    cultivation.record_meditation(180, NOW);
    cultivation.add_journal("今日静坐", NOW);
    let mut realm = RealmRecord::default();
    realm.add_experience(1250);

    let json = export_json(&cultivation, &realm, &[], NOW).unwrap();
    let profile = import_json(&json).unwrap();
    let json2 = export_json(&profile.cultivation, &profile.realm, &profile.tasks, NOW).unwrap();
    assert_eq!(json, json2);
}

proptest! {
    /// Level and progress are total functions of the session count.
    #[test]
    fn level_progress_law(sessions in 0u32..200) {
        let mut record = CultivationRecord::default();
        for i in 0..sessions {
            record.record_meditation(60, NOW + i as u64 * DAY);
        }
        let count = record.meditation_count;
        prop_assert_eq!(record.level, count / 10 + 1);
        prop_assert_eq!(record.progress, (count % 10) * 10);
        prop_assert!(record.progress <= 90);
    }

    /// Experience below the remaining threshold never levels; at or past it,
    /// exactly one level is gained and the old threshold is subtracted.
    #[test]
    fn add_experience_law(level in 1u32..60, exp_frac in 0u64..1000, amount in 0u64..200_000) {
        let threshold = exp_for_next_level(level);
        let exp = exp_frac.min(threshold.saturating_sub(1));
        let mut realm = RealmRecord { schema_version: 1, level, exp };

        let up = realm.add_experience(amount);
        if exp + amount < threshold {
            prop_assert!(up.is_none());
            prop_assert_eq!(realm.level, level);
            prop_assert_eq!(realm.exp, exp + amount);
        } else {
            prop_assert!(up.is_some());
            prop_assert_eq!(realm.level, level + 1);
            prop_assert_eq!(realm.exp, exp + amount - threshold);
        }
    }

    /// The realm table is total over valid levels and respects its bounds.
    #[test]
    fn realm_lookup_total(level in 1u32..200) {
        let realm = realm_for(level);
        if level <= 50 {
            prop_assert!(realm.min_level <= level && level <= realm.max_level);
        } else {
            prop_assert_eq!(realm.key, "mastery");
        }
    }
}
