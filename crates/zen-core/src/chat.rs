//! Daily master-chat allowance.

use serde::{Deserialize, Serialize};

use crate::constants::DAILY_CHAT_LIMIT;
use crate::time::CalendarDay;

/// How many master chats were spent on a given calendar day.
/// The counter rolls over automatically when the day changes.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatUsage {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub used: u32,
}

impl ChatUsage {
    /// Chats left today.
    pub fn remaining(&mut self, now_unix: u64) -> u32 {
        self.roll(now_unix);
        DAILY_CHAT_LIMIT.saturating_sub(self.used)
    }

    /// Consume one chat. Returns false when the day's allowance is spent.
    pub fn try_consume(&mut self, now_unix: u64) -> bool {
        self.roll(now_unix);
        if self.used >= DAILY_CHAT_LIMIT {
            return false;
        }
        self.used += 1;
        true
    }

    fn roll(&mut self, now_unix: u64) {
        let today = CalendarDay::from_unix(now_unix).to_string();
        if self.day != today {
            self.day = today;
            self.used = 0;
        }
    }
}
