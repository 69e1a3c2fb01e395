//! Property-based tests over list filtering.
//!
//! Uses proptest to verify:
//! 1. Filtering keeps exactly the matching rows, in mirror order.
//! 2. Filtering is idempotent and an empty selection keeps everything.
//! 3. Tag options stay distinct and ordered by first appearance.
//! 4. The list summary always describes the filtered rows.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use taskdeck::filter::{filter_tasks, tag_options, StatusFilter, TaskFilter};
use taskdeck::view::list::ListProjector;
use taskdeck_model::{Priority, Task, TaskId};
use uuid::Uuid;

// --- Strategies ---

/// Strategy for generating arbitrary `Priority` values.
fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::High),
        Just(Priority::Medium),
        Just(Priority::Low),
    ]
}

/// Strategy for generating arbitrary `StatusFilter` values.
fn arb_status() -> impl Strategy<Value = StatusFilter> {
    prop_oneof![Just(StatusFilter::Completed), Just(StatusFilter::Pending)]
}

/// Strategy for tags, drawn from a small pool so tasks and filters overlap.
fn arb_tag() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("work".to_string()),
        Just("home".to_string()),
        Just("health".to_string()),
        Just("errands".to_string()),
    ]
}

/// Strategy for timestamps within a sane range.
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..2_000_000_000).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
}

/// Strategy for a single task. Identity is rewritten by `arb_tasks` so
/// every task in a generated list is distinct.
fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[a-z ]{1,16}",
        prop::option::of(arb_priority()),
        prop::option::of(arb_tag()),
        any::<bool>(),
        prop::option::of(arb_instant()),
        arb_instant(),
    )
        .prop_map(
            |(title, priority, tag, completed, due_date, created_at)| Task {
                id: TaskId::from_uuid(Uuid::nil()),
                title,
                description: None,
                due_date,
                end_date: None,
                priority,
                tag,
                repeating: false,
                completed,
                created_at,
                updated_at: created_at,
            },
        )
}

/// Strategy for a task list with unique identifiers.
fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_task(), 0..12).prop_map(|mut tasks| {
        for (index, task) in tasks.iter_mut().enumerate() {
            task.id = TaskId::from_uuid(Uuid::from_u128(index as u128 + 1));
        }
        tasks
    })
}

/// Strategy for arbitrary filter selections, possibly empty.
fn arb_filter() -> impl Strategy<Value = TaskFilter> {
    (
        prop::collection::vec(arb_status(), 0..3),
        prop::collection::vec(arb_priority(), 0..4),
        prop::collection::vec(arb_tag(), 0..3),
    )
        .prop_map(|(statuses, priorities, tags)| {
            let mut filter = TaskFilter::default();
            for status in statuses {
                filter = filter.with_status(status);
            }
            for priority in priorities {
                filter = filter.with_priority(priority);
            }
            for tag in tags {
                filter = filter.with_tag(tag);
            }
            filter
        })
}

// --- Property tests ---

proptest! {
    /// Every surviving row matches the filter, and the survivors keep
    /// their relative order from the input.
    #[test]
    fn filtering_keeps_matching_rows_in_order(tasks in arb_tasks(), filter in arb_filter()) {
        let kept = filter_tasks(&tasks, &filter);

        for task in &kept {
            prop_assert!(filter.matches(task));
        }

        let kept_ids: Vec<&TaskId> = kept.iter().map(|t| &t.id).collect();
        let expected: Vec<&TaskId> = tasks
            .iter()
            .filter(|t| filter.matches(t))
            .map(|t| &t.id)
            .collect();
        prop_assert_eq!(kept_ids, expected);
    }

    /// Rows the filter drops really fail the selection.
    #[test]
    fn dropped_rows_fail_the_filter(tasks in arb_tasks(), filter in arb_filter()) {
        let kept = filter_tasks(&tasks, &filter);
        for task in &tasks {
            let survived = kept.iter().any(|k| k.id == task.id);
            prop_assert_eq!(survived, filter.matches(task));
        }
    }

    /// Filtering an already-filtered list changes nothing.
    #[test]
    fn filtering_is_idempotent(tasks in arb_tasks(), filter in arb_filter()) {
        let once: Vec<Task> = filter_tasks(&tasks, &filter).into_iter().cloned().collect();
        let twice = filter_tasks(&once, &filter);
        prop_assert_eq!(once.len(), twice.len());
    }

    /// An empty selection keeps every row.
    #[test]
    fn an_unconstrained_filter_keeps_everything(tasks in arb_tasks()) {
        let filter = TaskFilter::default();
        prop_assert!(filter.is_unconstrained());
        prop_assert_eq!(filter_tasks(&tasks, &filter).len(), tasks.len());
    }

    /// Tag options are distinct, non-empty, and ordered by the first
    /// task that carries each tag.
    #[test]
    fn tag_options_are_distinct_and_in_first_appearance_order(tasks in arb_tasks()) {
        let options = tag_options(&tasks);

        let mut expected = Vec::new();
        for tag in tasks.iter().filter_map(|t| t.tag.as_deref()) {
            if !tag.is_empty() && !expected.iter().any(|seen: &String| seen == tag) {
                expected.push(tag.to_string());
            }
        }
        prop_assert_eq!(options, expected);
    }

    /// The summary line always counts the filtered rows, never the
    /// whole mirror.
    #[test]
    fn the_summary_reflects_the_filtered_rows(tasks in arb_tasks(), filter in arb_filter()) {
        let projector = ListProjector::new("%Y-%m-%d");
        let view = projector.project(&tasks, &filter, Utc::now());

        let kept = filter_tasks(&tasks, &filter);
        let completed = kept.iter().filter(|t| t.completed).count();
        prop_assert_eq!(view.items.len(), kept.len());
        prop_assert_eq!(view.summary, format!("{} tasks ({completed} completed)", kept.len()));
    }
}
