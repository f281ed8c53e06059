use serde::{Deserialize, Serialize};

/// A practice milestone counted in completed sessions.
///
/// Among incomplete goals at most one is active at a time; completing the
/// active goal hands activation to the next eligible goal in list order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    pub title: String,
    pub target: u32,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub active: bool,
}

impl Goal {
    pub fn new(title: &str, target: u32, active: bool) -> Self {
        Self {
            title: title.to_string(),
            target,
            progress: 0,
            completed: false,
            active,
        }
    }
}

/// Starter goals seeded into a fresh profile.
pub fn default_goals() -> Vec<Goal> {
    vec![
        Goal::new("初习坐禅", 7, true),
        Goal::new("达到一小时禅定", 10, false),
    ]
}

/// Advance every active, incomplete goal by one session.
///
/// A goal reaching its target is marked completed and deactivated, and the
/// first goal that is neither completed nor active takes over. The sweep
/// runs over the live list, so a successor appearing later in the list also
/// counts the session that completed its predecessor.
/// Returns the titles of goals completed by this call.
pub fn advance_goals(goals: &mut [Goal]) -> Vec<String> {
    let mut finished = Vec::new();

    for i in 0..goals.len() {
        if !goals[i].active || goals[i].completed {
            continue;
        }
        goals[i].progress += 1;
        if goals[i].progress >= goals[i].target {
            goals[i].completed = true;
            goals[i].active = false;
            finished.push(goals[i].title.clone());
            if let Some(next) = goals.iter_mut().find(|g| !g.completed && !g.active) {
                next.active = true;
            }
        }
    }

    finished
}

/// True when at most one goal is active among the incomplete ones.
pub fn activation_invariant_holds(goals: &[Goal]) -> bool {
    goals.iter().filter(|g| g.active && !g.completed).count() <= 1
        && !goals.iter().any(|g| g.active && g.completed)
}
