//! Notification seam between the trackers and whatever UI hosts them.
//!
//! The capability is explicit: callers receive a no-op implementation when
//! no UI is attached, so there are no presence checks at the call sites.

/// Receives progression events. Fire-and-forget: the trackers never depend
/// on a return value, and implementations must not fail.
pub trait ProgressionObserver {
    /// Cultivation level-up banner (auto-dismissing in the web UI).
    fn level_up(&self, level: u32);

    /// Realm level-up modal: new level, realm name, and a drawn quote.
    fn realm_level_up(&self, level: u32, realm_name: &str, quote: &str);
}

/// The absent-capability implementation.
pub struct NullObserver;

impl ProgressionObserver for NullObserver {
    fn level_up(&self, _level: u32) {}

    fn realm_level_up(&self, _level: u32, _realm_name: &str, _quote: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_observer_is_silent() {
        let observer = NullObserver;
        observer.level_up(2);
        observer.realm_level_up(6, "明心", "心若冰清，天塌不惊。");
    }
}
