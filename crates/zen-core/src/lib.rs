//! Progression engine for the zen companion.
//!
//! Two independent tracks run side by side and are never reconciled: the
//! cultivation profile (session counts, daily streaks, goals, wisdom and
//! journal logs) and the realm profile (experience levels mapped onto named
//! realms). Every transition is a pure function of the record and an
//! injected clock value.
//!
//! Zero I/O — no opinions about transport or persistence.

pub mod chat;
pub mod constants;
pub mod cultivation;
pub mod export;
pub mod goal;
pub mod observer;
pub mod planner;
pub mod quotes;
pub mod realm;
pub mod time;

pub use chat::ChatUsage;
pub use constants::{
    DAILY_CHAT_LIMIT, DEFAULT_MEDITATION_SECS, EXP_PER_LEVEL_UNIT, MEDITATION_EXP,
    MEDITATIONS_PER_LEVEL, PROGRESS_STEP, STREAK_BREAK_DAYS, WISDOM_QUOTE_CAP,
};
pub use cultivation::{CultivationRecord, JournalEntry, MeditationOutcome, WisdomQuote};
pub use export::{EXPORT_VERSION, ProfileExport, export_json, import_json};
pub use goal::{Goal, advance_goals, default_goals};
pub use observer::{NullObserver, ProgressionObserver};
pub use planner::{
    Priority, RepeatKind, Task, TaskFilter, TaskStats, TaskUpdate, expand_repeats, filter_tasks,
    next_task_id, remove_task, task_stats, update_task,
};
pub use quotes::{
    LEVEL_UP_QUOTES, ZEN_QUOTES, master_reply, random_level_up_quote, random_zen_quote,
};
pub use realm::{REALMS, Realm, RealmLevelUp, RealmRecord, exp_for_next_level, realm_for};
pub use time::{
    CalendarDay, now_iso8601, now_unix_secs, parse_iso8601, unix_to_iso8601,
};
