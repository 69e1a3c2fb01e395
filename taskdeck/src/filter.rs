//! Pure filtering over the task mirror.
//!
//! A [`TaskFilter`] holds three independent category selections. Within
//! a category any selected value may match (OR); across categories every
//! constrained category must match (AND); an empty category constrains
//! nothing. Filtering never reorders: the output is a subsequence of the
//! input, and running the same filter twice changes nothing.

use std::collections::BTreeSet;

use taskdeck_model::{Priority, Task};

/// Completion-status values selectable in the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusFilter {
    /// Only completed tasks.
    Completed,
    /// Only open tasks.
    Pending,
}

impl StatusFilter {
    const fn matches(self, task: &Task) -> bool {
        match self {
            Self::Completed => task.completed,
            Self::Pending => !task.completed,
        }
    }
}

/// The user's current filter selection.
///
/// A task with no priority matches only while the priority category is
/// unconstrained, and likewise for missing tags: selecting any value in
/// a category excludes tasks that have none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Selected completion statuses.
    pub statuses: BTreeSet<StatusFilter>,
    /// Selected priorities.
    pub priorities: BTreeSet<Priority>,
    /// Selected tag values.
    pub tags: BTreeSet<String>,
}

impl TaskFilter {
    /// Adds a status to the selection.
    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.statuses.insert(status);
        self
    }

    /// Adds a priority to the selection.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priorities.insert(priority);
        self
    }

    /// Adds a tag to the selection.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// True when no category constrains anything.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.statuses.is_empty() && self.priorities.is_empty() && self.tags.is_empty()
    }

    /// Whether one task passes the selection.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok =
            self.statuses.is_empty() || self.statuses.iter().any(|status| status.matches(task));
        let priority_ok = self.priorities.is_empty()
            || task
                .priority
                .is_some_and(|priority| self.priorities.contains(&priority));
        let tag_ok = self.tags.is_empty()
            || task
                .tag
                .as_deref()
                .is_some_and(|tag| self.tags.contains(tag));

        status_ok && priority_ok && tag_ok
    }
}

/// Applies a filter, preserving mirror order.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Distinct non-empty tag values in first-appearance order.
///
/// Recomputed from the mirror on every change so the tag filter bar
/// always offers exactly the tags that exist. The empty-string guard
/// covers documents written before empty tags were normalized away.
#[must_use]
pub fn tag_options(tasks: &[Task]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut options = Vec::new();
    for tag in tasks.iter().filter_map(|task| task.tag.as_deref()) {
        if !tag.is_empty() && seen.insert(tag) {
            options.push(tag.to_string());
        }
    }
    options
}
