//! Client-side filtering of a task collection.
//!
//! Filtering is pure and synchronous: it never talks to the backend and never
//! mutates the collection it reads.

use serde::{Deserialize, Serialize};

use crate::task::{Priority, Status, Task};

/// The three filter controls of the task list.
///
/// Every component is combined with AND. An empty class name and `None`
/// status/priority match everything, so the default filter is the identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Case-insensitive substring match against the class name
    #[serde(default)]
    pub class_name: String,
    /// Exact status match
    #[serde(default)]
    pub status: Option<Status>,
    /// Exact priority match
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Whether this filter matches every task
    pub fn is_identity(&self) -> bool {
        self.class_name.is_empty() && self.status.is_none() && self.priority.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.class_name.is_empty() {
            let haystack = task.class_name().to_lowercase();
            if !haystack.contains(&self.class_name.to_lowercase()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status() != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority() != priority {
                return false;
            }
        }
        true
    }
}

/// Apply `filter` to `tasks`, producing a new sequence in the same order.
pub fn apply(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    tasks.iter().filter(|task| filter.matches(task)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskDraft, TaskId, VersionTag};

    fn sample_task(id: i64, class_name: &str, status: Status, priority: Priority) -> Task {
        let draft = TaskDraft {
            class_name: class_name.to_string(),
            assignment: format!("Assignment {}", id),
            status,
            priority,
            ..TaskDraft::default()
        };
        Task::new_with_parameters(TaskId::from(id), draft, None, VersionTag::from("v1".to_string()))
    }

    fn sample_collection() -> Vec<Task> {
        vec![
            sample_task(1, "CS101", Status::Completed, Priority::High),
            sample_task(2, "CS101", Status::Pending, Priority::Medium),
            sample_task(3, "Math 200", Status::Pending, Priority::Low),
        ]
    }

    #[test]
    fn the_empty_filter_is_the_identity() {
        let tasks = sample_collection();
        let filter = TaskFilter::default();
        assert!(filter.is_identity());
        assert_eq!(apply(&tasks, &filter), tasks);
    }

    #[test]
    fn filtering_is_idempotent_and_leaves_the_source_untouched() {
        let tasks = sample_collection();
        let before = tasks.clone();
        let filter = TaskFilter { status: Some(Status::Pending), ..TaskFilter::default() };

        let once = apply(&tasks, &filter);
        let twice = apply(&once, &filter);
        assert_eq!(once, twice);
        assert_eq!(tasks, before);
    }

    #[test]
    fn status_match_is_exact() {
        let tasks = sample_collection();
        let filter = TaskFilter { status: Some(Status::Completed), ..TaskFilter::default() };
        let filtered = apply(&tasks, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id(), TaskId::from(1));
    }

    #[test]
    fn class_match_is_a_case_insensitive_substring() {
        let tasks = sample_collection();

        let filter = TaskFilter { class_name: "cs1".to_string(), ..TaskFilter::default() };
        assert_eq!(apply(&tasks, &filter).len(), 2);

        let filter = TaskFilter { class_name: "MATH".to_string(), ..TaskFilter::default() };
        assert_eq!(apply(&tasks, &filter).len(), 1);

        let filter = TaskFilter { class_name: "physics".to_string(), ..TaskFilter::default() };
        assert!(apply(&tasks, &filter).is_empty());
    }

    #[test]
    fn all_components_are_anded() {
        let tasks = sample_collection();
        let filter = TaskFilter {
            class_name: "cs101".to_string(),
            status: Some(Status::Pending),
            priority: Some(Priority::Medium),
        };
        let filtered = apply(&tasks, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id(), TaskId::from(2));

        let filter = TaskFilter {
            class_name: "cs101".to_string(),
            status: Some(Status::Pending),
            priority: Some(Priority::High),
        };
        assert!(apply(&tasks, &filter).is_empty());
    }

    #[test]
    fn filtering_preserves_the_backend_order() {
        let tasks = sample_collection();
        let filter = TaskFilter { status: Some(Status::Pending), ..TaskFilter::default() };
        let filtered = apply(&tasks, &filter);
        assert_eq!(filtered[0].id(), TaskId::from(2));
        assert_eq!(filtered[1].id(), TaskId::from(3));
    }
}
