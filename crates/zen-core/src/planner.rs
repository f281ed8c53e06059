//! Life-planner tasks: date filters, repeat expansion, aggregate stats.
//!
//! Pure rules over task slices; storage and the HTTP surface live in the
//! other crates.

use serde::{Deserialize, Serialize};

use crate::time::CalendarDay;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RepeatKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Some(RepeatKind::None),
            "daily" => Some(RepeatKind::Daily),
            "weekly" => Some(RepeatKind::Weekly),
            "monthly" => Some(RepeatKind::Monthly),
            _ => None,
        }
    }

    /// Day spacing between scheduled instances. Monthly repeats are
    /// scheduled 30 days apart, matching the hosted backend.
    fn span_days(self) -> Option<i64> {
        match self {
            RepeatKind::None => None,
            RepeatKind::Daily => Some(1),
            RepeatKind::Weekly => Some(7),
            RepeatKind::Monthly => Some(30),
        }
    }
}

/// A planner task. Dates are ISO `YYYY-MM-DD` strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub priority: Priority,
    pub date: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "repeat_type")]
    pub repeat: RepeatKind,
    #[serde(default, alias = "repeat_value")]
    pub repeat_count: u32,
    #[serde(default, alias = "parent_task_id")]
    pub parent_id: Option<u64>,
}

fn default_category() -> String {
    "task".to_string()
}

impl Task {
    pub fn new(id: u64, title: &str, priority: Priority, date: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            priority,
            date: date.to_string(),
            completed: false,
            category: default_category(),
            description: String::new(),
            repeat: RepeatKind::None,
            repeat_count: 0,
            parent_id: None,
        }
    }

    fn day(&self) -> Option<CalendarDay> {
        CalendarDay::parse_iso(&self.date)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Today,
    Upcoming,
    Past,
}

impl TaskFilter {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "today" => TaskFilter::Today,
            "upcoming" => TaskFilter::Upcoming,
            "past" => TaskFilter::Past,
            _ => TaskFilter::All,
        }
    }
}

/// Tasks matching a filter relative to `today`, newest date first and
/// high-priority first within a date. Tasks with unparseable dates only
/// show under `All`.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: TaskFilter, today: CalendarDay) -> Vec<&'a Task> {
    let mut matched: Vec<&Task> = tasks
        .iter()
        .filter(|t| match filter {
            TaskFilter::All => true,
            TaskFilter::Today => t.day() == Some(today),
            TaskFilter::Upcoming => t.day().is_some_and(|d| d > today),
            TaskFilter::Past => t.day().is_some_and(|d| d < today),
        })
        .collect();

    matched.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
    });
    matched
}

/// Expand a repeating task into its scheduled instances.
///
/// The parent keeps the repeat rule; instances get sequential ids starting
/// at `next_id`, point back via `parent_id`, and carry no rule of their own.
/// A task without a repeat rule expands to nothing.
pub fn expand_repeats(parent: &Task, next_id: u64) -> Vec<Task> {
    let Some(span) = parent.repeat.span_days() else {
        return Vec::new();
    };
    let Some(start) = parent.day() else {
        return Vec::new();
    };

    (1..=parent.repeat_count as i64)
        .map(|i| {
            let mut instance =
                Task::new(next_id + (i - 1) as u64, &parent.title, parent.priority, "");
            instance.date = start.add_days(i * span).to_string();
            instance.category = parent.category.clone();
            instance.description = parent.description.clone();
            instance.parent_id = Some(parent.id);
            instance
        })
        .collect()
}

/// Next id for a new task. Ids grow from the current maximum, echoing the
/// backend's autoincrement column.
pub fn next_task_id(tasks: &[Task]) -> u64 {
    tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
}

/// Partial task update; absent fields keep their stored values.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub date: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Apply an update to one task. Returns false when the id is unknown.
pub fn update_task(tasks: &mut [Task], id: u64, update: &TaskUpdate) -> bool {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return false;
    };
    if let Some(title) = &update.title {
        task.title = title.clone();
    }
    if let Some(priority) = update.priority {
        task.priority = priority;
    }
    if let Some(date) = &update.date {
        task.date = date.clone();
    }
    if let Some(completed) = update.completed {
        task.completed = completed;
    }
    if let Some(category) = &update.category {
        task.category = category.clone();
    }
    if let Some(description) = &update.description {
        task.description = description.clone();
    }
    true
}

/// Remove a task. When `delete_all` is set and the target is a repeat
/// instance, its whole family (parent plus every instance) goes with it.
/// Returns the number of tasks removed.
pub fn remove_task(tasks: &mut Vec<Task>, id: u64, delete_all: bool) -> usize {
    let before = tasks.len();
    let parent = tasks.iter().find(|t| t.id == id).and_then(|t| t.parent_id);
    match (parent, delete_all) {
        (Some(parent), true) => {
            tasks.retain(|t| t.parent_id != Some(parent) && t.id != parent);
        }
        _ => tasks.retain(|t| t.id != id),
    }
    before - tasks.len()
}

/// Aggregate counters for the planner dashboard.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub completed_total: usize,
    pub today_pending: usize,
    pub upcoming_total: usize,
    pub high_pending: usize,
    pub medium_pending: usize,
    pub low_pending: usize,
}

pub fn task_stats(tasks: &[Task], today: CalendarDay) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in tasks {
        if task.completed {
            stats.completed_total += 1;
        } else {
            match task.priority {
                Priority::High => stats.high_pending += 1,
                Priority::Medium => stats.medium_pending += 1,
                Priority::Low => stats.low_pending += 1,
            }
            if task.day() == Some(today) {
                stats.today_pending += 1;
            }
        }
        if task.day().is_some_and(|d| d > today) {
            stats.upcoming_total += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> CalendarDay {
        CalendarDay::from_ymd(2026, 2, 21)
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new(1, "buy chain oil", Priority::Low, "2026-02-20"),
            Task::new(2, "service brakes", Priority::High, "2026-02-21"),
            Task::new(3, "plan route", Priority::Medium, "2026-02-21"),
            Task::new(4, "renew insurance", Priority::High, "2026-03-01"),
        ]
    }

    #[test]
    fn test_filter_today() {
        let tasks = sample_tasks();
        let hits = filter_tasks(&tasks, TaskFilter::Today, today());
        assert_eq!(hits.len(), 2);
        // High priority first within the same date.
        assert_eq!(hits[0].id, 2);
        assert_eq!(hits[1].id, 3);
    }

    #[test]
    fn test_filter_upcoming_and_past() {
        let tasks = sample_tasks();
        let upcoming = filter_tasks(&tasks, TaskFilter::Upcoming, today());
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, 4);

        let past = filter_tasks(&tasks, TaskFilter::Past, today());
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].id, 1);
    }

    #[test]
    fn test_filter_all_sorts_newest_first() {
        let tasks = sample_tasks();
        let all = filter_tasks(&tasks, TaskFilter::All, today());
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, 4);
        assert_eq!(all[3].id, 1);
    }

    #[test]
    fn test_unparseable_date_only_in_all() {
        let mut tasks = sample_tasks();
        tasks.push(Task::new(5, "someday", Priority::Low, "whenever"));
        assert_eq!(filter_tasks(&tasks, TaskFilter::All, today()).len(), 5);
        assert_eq!(filter_tasks(&tasks, TaskFilter::Today, today()).len(), 2);
        assert_eq!(filter_tasks(&tasks, TaskFilter::Upcoming, today()).len(), 1);
    }

    #[test]
    fn test_expand_daily_repeats() {
        let mut parent = Task::new(7, "morning ride", Priority::Medium, "2026-02-21");
        parent.repeat = RepeatKind::Daily;
        parent.repeat_count = 3;

        let instances = expand_repeats(&parent, 100);
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].id, 100);
        assert_eq!(instances[0].date, "2026-02-22");
        assert_eq!(instances[2].date, "2026-02-24");
        assert!(instances.iter().all(|t| t.parent_id == Some(7)));
        assert!(instances.iter().all(|t| t.repeat == RepeatKind::None));
    }

    #[test]
    fn test_expand_monthly_spacing() {
        let mut parent = Task::new(7, "pay rent", Priority::High, "2026-01-01");
        parent.repeat = RepeatKind::Monthly;
        parent.repeat_count = 2;

        let instances = expand_repeats(&parent, 10);
        assert_eq!(instances[0].date, "2026-01-31");
        assert_eq!(instances[1].date, "2026-03-02");
    }

    #[test]
    fn test_expand_without_rule_is_empty() {
        let parent = Task::new(1, "one-off", Priority::Low, "2026-02-21");
        assert!(expand_repeats(&parent, 10).is_empty());
    }

    #[test]
    fn test_stats() {
        let mut tasks = sample_tasks();
        tasks[0].completed = true;
        let stats = task_stats(&tasks, today());

        assert_eq!(stats.completed_total, 1);
        assert_eq!(stats.today_pending, 2);
        assert_eq!(stats.upcoming_total, 1);
        assert_eq!(stats.high_pending, 2);
        assert_eq!(stats.medium_pending, 1);
        assert_eq!(stats.low_pending, 0);
    }

    #[test]
    fn test_next_task_id() {
        assert_eq!(next_task_id(&[]), 1);
        assert_eq!(next_task_id(&sample_tasks()), 5);
    }

    #[test]
    fn test_update_task() {
        let mut tasks = sample_tasks();
        let done = TaskUpdate {
            completed: Some(true),
            ..TaskUpdate::default()
        };
        assert!(update_task(&mut tasks, 2, &done));
        assert!(tasks[1].completed);
        assert_eq!(tasks[1].title, "service brakes");

        assert!(!update_task(&mut tasks, 99, &done));
    }

    #[test]
    fn test_remove_single_task() {
        let mut tasks = sample_tasks();
        assert_eq!(remove_task(&mut tasks, 2, false), 1);
        assert!(!tasks.iter().any(|t| t.id == 2));
        assert_eq!(remove_task(&mut tasks, 99, false), 0);
    }

    #[test]
    fn test_remove_repeat_family() {
        let mut parent = Task::new(1, "ride", Priority::Low, "2026-02-21");
        parent.repeat = RepeatKind::Daily;
        parent.repeat_count = 2;
        let mut tasks = vec![parent.clone()];
        tasks.extend(expand_repeats(&parent, 2));
        tasks.push(Task::new(10, "unrelated", Priority::High, "2026-02-21"));

        // delete_all on an instance takes the parent and both instances.
        assert_eq!(remove_task(&mut tasks, 3, true), 3);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 10);
    }

    #[test]
    fn test_delete_all_on_plain_task_removes_only_it() {
        let mut tasks = sample_tasks();
        assert_eq!(remove_task(&mut tasks, 1, true), 1);
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("High"), Some(Priority::High));
        assert_eq!(Priority::parse("medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(RepeatKind::parse("weekly"), Some(RepeatKind::Weekly));
        assert_eq!(RepeatKind::parse("fortnightly"), None);
    }

    #[test]
    fn test_legacy_field_names_deserialize() {
        let json = r#"{
            "id": 3, "title": "t", "priority": "high", "date": "2026-02-21",
            "repeat_type": "weekly", "repeat_value": 2, "parent_task_id": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.repeat, RepeatKind::Weekly);
        assert_eq!(task.repeat_count, 2);
        assert_eq!(task.category, "task");
    }
}
