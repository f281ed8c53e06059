/// Completed sessions required to advance one cultivation level.
pub const MEDITATIONS_PER_LEVEL: u32 = 10;

/// Progress-bar step per session within the current level (percent).
pub const PROGRESS_STEP: u32 = 10;

/// Wisdom quote history cap; the oldest entry is evicted past this.
pub const WISDOM_QUOTE_CAP: usize = 10;

/// Experience required to leave a realm level: level × EXP_PER_LEVEL_UNIT.
pub const EXP_PER_LEVEL_UNIT: u64 = 1000;

/// Experience granted for one completed meditation session.
pub const MEDITATION_EXP: u64 = 50;

/// Master chats allowed per calendar day.
pub const DAILY_CHAT_LIMIT: u32 = 3;

/// Default meditation session length in seconds.
pub const DEFAULT_MEDITATION_SECS: u32 = 180;

/// Calendar-day gap beyond which a streak counts as broken.
pub const STREAK_BREAK_DAYS: i64 = 1;
