//! The tracker control loop: load a record, apply the transition, persist,
//! then notify. One session instance wraps one user's store.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use zen_core::{
    CultivationRecord, MEDITATION_EXP, MeditationOutcome, ProgressionObserver, RealmRecord,
    master_reply, now_unix_secs, random_level_up_quote,
};
use zen_store::UserStore;

/// Snapshot returned by a completed meditation, for display.
pub struct MeditationReport {
    pub cultivation: CultivationRecord,
    pub realm: RealmRecord,
    pub outcome: MeditationOutcome,
}

pub struct Session<'a, O: ProgressionObserver> {
    store: &'a UserStore,
    observer: O,
    rng: SmallRng,
}

impl<'a, O: ProgressionObserver> Session<'a, O> {
    pub fn new(store: &'a UserStore, observer: O) -> Self {
        Self {
            store,
            observer,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Record one completed meditation. Feeds both tracks: the session
    /// count on the cultivation side, a fixed experience grant on the
    /// realm side.
    pub fn complete_meditation(&mut self, duration_secs: u32) -> Result<MeditationReport> {
        let now = now_unix_secs();

        let mut cultivation = self.load_cultivation_checked(now)?;
        let outcome = cultivation.record_meditation(duration_secs, now);
        self.store
            .store()
            .save_cultivation(&cultivation)
            .context("failed to save cultivation record")?;
        if let Some(level) = outcome.leveled_up_to {
            self.observer.level_up(level);
        }

        let mut realm = self.store.store().load_realm();
        let level_up = realm.add_experience(MEDITATION_EXP);
        self.store
            .store()
            .save_realm(&realm)
            .context("failed to save realm record")?;
        if let Some(up) = level_up {
            let quote = random_level_up_quote(&mut self.rng);
            self.observer.realm_level_up(up.new_level, up.realm_name, quote);
        }

        Ok(MeditationReport {
            cultivation,
            realm,
            outcome,
        })
    }

    /// Record a master exchange into the wisdom log.
    pub fn record_chat(&mut self, response: &str) -> Result<()> {
        let now = now_unix_secs();
        let mut cultivation = self.load_cultivation_checked(now)?;
        cultivation.record_chat(response, now);
        self.store
            .store()
            .save_cultivation(&cultivation)
            .context("failed to save cultivation record")
    }

    /// Compose a local master reply, consuming today's chat allowance.
    /// None when the allowance is spent.
    pub fn local_master_reply(&mut self, message: &str) -> Result<Option<(String, u32)>> {
        let now = now_unix_secs();
        let mut usage = self.store.store().load_chat_usage();
        if !usage.try_consume(now) {
            return Ok(None);
        }
        self.store
            .store()
            .save_chat_usage(&usage)
            .context("failed to save chat usage")?;
        let reply = master_reply(message, &mut self.rng);
        Ok(Some((reply, usage.remaining(now))))
    }

    pub fn add_journal(&mut self, content: &str) -> Result<()> {
        let now = now_unix_secs();
        let mut cultivation = self.load_cultivation_checked(now)?;
        cultivation.add_journal(content, now);
        self.store
            .store()
            .save_cultivation(&cultivation)
            .context("failed to save cultivation record")
    }

    /// Load the cultivation record with the streak-break check applied.
    /// A reset is persisted immediately so later loads agree.
    pub fn load_cultivation_checked(&self, now: u64) -> Result<CultivationRecord> {
        let mut cultivation = self.store.store().load_cultivation();
        if cultivation.check_daily_streak(now) {
            tracing::info!("daily streak broken, reset to 0");
            self.store
                .store()
                .save_cultivation(&cultivation)
                .context("failed to persist streak reset")?;
        }
        Ok(cultivation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zen_core::NullObserver;

    #[test]
    fn test_meditation_updates_both_tracks() {
        let store = UserStore::open_in_memory().unwrap();
        let mut session = Session::new(&store, NullObserver);

        let report = session.complete_meditation(180).unwrap();
        assert_eq!(report.cultivation.meditation_count, 1);
        assert_eq!(report.realm.exp, MEDITATION_EXP);

        // And both actually persisted.
        assert_eq!(store.store().load_cultivation().meditation_count, 1);
        assert_eq!(store.store().load_realm().exp, MEDITATION_EXP);
    }

    #[test]
    fn test_chat_allowance_exhausts() {
        let store = UserStore::open_in_memory().unwrap();
        let mut session = Session::new(&store, NullObserver);

        for _ in 0..3 {
            let reply = session.local_master_reply("何为禅？").unwrap();
            let (text, _remaining) = reply.expect("allowance should not be spent yet");
            session.record_chat(&text).unwrap();
        }
        assert!(session.local_master_reply("再问一次").unwrap().is_none());

        let cultivation = store.store().load_cultivation();
        assert_eq!(cultivation.chat_count, 3);
        assert_eq!(cultivation.wisdom_quotes.len(), 3);
    }

    #[test]
    fn test_journal_persists() {
        let store = UserStore::open_in_memory().unwrap();
        let mut session = Session::new(&store, NullObserver);
        session.add_journal("今日静坐三分钟").unwrap();
        let cultivation = store.store().load_cultivation();
        assert_eq!(cultivation.journals.len(), 1);
        assert_eq!(cultivation.journals[0].content, "今日静坐三分钟");
    }
}
