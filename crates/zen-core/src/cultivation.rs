//! Cultivation progression: session counts, daily streaks, goals, and the
//! wisdom/journal logs.

use serde::{Deserialize, Serialize};

use crate::constants::{
    MEDITATIONS_PER_LEVEL, PROGRESS_STEP, STREAK_BREAK_DAYS, WISDOM_QUOTE_CAP,
};
use crate::goal::{self, Goal};
use crate::time::{CalendarDay, parse_iso8601, unix_to_iso8601};

/// One wisdom quote retained from a master exchange. Newest first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WisdomQuote {
    pub text: String,
    pub date: String,
    pub id: u64,
}

/// One free-form practice journal entry. Newest first, unbounded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JournalEntry {
    pub content: String,
    pub date: String,
    pub id: u64,
}

/// What one recorded session changed, for the caller to surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeditationOutcome {
    /// Set when this session crossed a level threshold.
    pub leveled_up_to: Option<u32>,
    /// Titles of goals completed by this session.
    pub completed_goals: Vec<String>,
    /// Whether the streak advanced (first session of the calendar day).
    pub streak_extended: bool,
}

/// The singleton cultivation profile.
///
/// Field aliases accept the camelCase shape the browser app writes to local
/// storage, so an exported `zenUserData` blob loads unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CultivationRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub progress: u32,
    #[serde(default, alias = "meditationCount")]
    pub meditation_count: u32,
    #[serde(default, alias = "streakDays")]
    pub streak_days: u32,
    #[serde(default, alias = "chatCount")]
    pub chat_count: u32,
    /// ISO-8601 timestamp of the last recorded session, if any.
    #[serde(default, alias = "lastMeditationDate")]
    pub last_meditation: Option<String>,
    #[serde(default, alias = "wisdomQuotes")]
    pub wisdom_quotes: Vec<WisdomQuote>,
    #[serde(default)]
    pub journals: Vec<JournalEntry>,
    #[serde(default = "goal::default_goals")]
    pub goals: Vec<Goal>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_level() -> u32 {
    1
}

impl Default for CultivationRecord {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            level: 1,
            progress: 0,
            meditation_count: 0,
            streak_days: 0,
            chat_count: 0,
            last_meditation: None,
            wisdom_quotes: Vec::new(),
            journals: Vec::new(),
            goals: goal::default_goals(),
        }
    }
}

impl CultivationRecord {
    /// Record one completed meditation session.
    ///
    /// `duration_secs` is accepted for the call surface but does not weight
    /// progression: levels and goals count sessions, not minutes.
    pub fn record_meditation(&mut self, _duration_secs: u32, now_unix: u64) -> MeditationOutcome {
        self.meditation_count += 1;

        let today = CalendarDay::from_unix(now_unix);
        let streak_extended = self.last_meditation_day() != Some(today);
        if streak_extended {
            self.streak_days += 1;
            self.last_meditation = Some(unix_to_iso8601(now_unix));
        }

        let leveled_up_to = self.update_level_and_progress();
        let completed_goals = goal::advance_goals(&mut self.goals);

        MeditationOutcome {
            leveled_up_to,
            completed_goals,
            streak_extended,
        }
    }

    /// Load-time streak-break check: a gap of more than one calendar day
    /// since the last session resets the streak. A 0- or 1-day gap keeps it.
    /// Returns true when the streak was reset.
    pub fn check_daily_streak(&mut self, now_unix: u64) -> bool {
        let Some(last) = self.last_meditation_day() else {
            return false;
        };
        let today = CalendarDay::from_unix(now_unix);
        if last.days_until(today) > STREAK_BREAK_DAYS {
            self.streak_days = 0;
            true
        } else {
            false
        }
    }

    /// Record a master exchange. Only the master's reply is retained; the
    /// user's message lives in the transient chat transcript.
    pub fn record_chat(&mut self, response: &str, now_unix: u64) {
        self.chat_count += 1;
        self.wisdom_quotes.insert(
            0,
            WisdomQuote {
                text: response.to_string(),
                date: CalendarDay::from_unix(now_unix).to_string(),
                id: now_unix,
            },
        );
        self.wisdom_quotes.truncate(WISDOM_QUOTE_CAP);
    }

    /// Prepend a journal entry. The journal grows without bound.
    pub fn add_journal(&mut self, content: &str, now_unix: u64) {
        self.journals.insert(
            0,
            JournalEntry {
                content: content.to_string(),
                date: CalendarDay::from_unix(now_unix).to_string(),
                id: now_unix,
            },
        );
    }

    fn update_level_and_progress(&mut self) -> Option<u32> {
        let new_level = self.meditation_count / MEDITATIONS_PER_LEVEL + 1;
        let leveled = if new_level > self.level {
            self.level = new_level;
            Some(new_level)
        } else {
            None
        };
        self.progress = (self.meditation_count % MEDITATIONS_PER_LEVEL) * PROGRESS_STEP;
        leveled
    }

    /// Calendar day of the last session. Unparseable timestamps read as no
    /// session at all, matching the absent-data behavior everywhere else.
    fn last_meditation_day(&self) -> Option<CalendarDay> {
        self.last_meditation
            .as_deref()
            .and_then(parse_iso8601)
            .map(CalendarDay::from_unix)
    }
}
