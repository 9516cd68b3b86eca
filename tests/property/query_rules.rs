//! Property-based tests for the query-state transition rules and the
//! store's monotonic-apply guarantee.
//!
//! Uses proptest to verify:
//! 1. Any filter change forces the page back to 1, from any prior state.
//! 2. A page change touches nothing but the page.
//! 3. For any completion order of any number of fetches, the store ends
//!    up reflecting the highest-sequence result that completed.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;

use taskhub::query::{TaskFilter, apply_filter, apply_page};
use taskhub::store::DomainStore;
use taskhub_api::query::{TaskQuery, TaskSort};
use taskhub_api::task::{Pagination, Task, TaskId, TaskPriority, TaskStatus};
use taskhub_api::user::UserId;

// --- strategies ---

fn arb_status() -> impl Strategy<Value = Option<TaskStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(TaskStatus::ToDo)),
        Just(Some(TaskStatus::InProgress)),
        Just(Some(TaskStatus::Completed)),
    ]
}

fn arb_priority() -> impl Strategy<Value = Option<TaskPriority>> {
    prop_oneof![
        Just(None),
        Just(Some(TaskPriority::Low)),
        Just(Some(TaskPriority::Medium)),
        Just(Some(TaskPriority::High)),
    ]
}

fn arb_sort() -> impl Strategy<Value = TaskSort> {
    prop_oneof![
        Just(TaskSort::DueDateDesc),
        Just(TaskSort::DueDateAsc),
        Just(TaskSort::PriorityDesc),
        Just(TaskSort::Status),
    ]
}

fn arb_query() -> impl Strategy<Value = TaskQuery> {
    (arb_status(), arb_priority(), arb_sort(), 1..500u32, 1..100u32).prop_map(
        |(status, priority, sort, page, limit)| TaskQuery {
            status,
            priority,
            sort,
            page,
            limit,
        },
    )
}

fn arb_filter() -> impl Strategy<Value = TaskFilter> {
    (arb_status(), arb_priority(), arb_sort()).prop_map(|(status, priority, sort)| TaskFilter {
        status,
        priority,
        sort,
    })
}

fn numbered_task(n: usize) -> Task {
    Task {
        id: TaskId::new(format!("t-{n}")),
        title: format!("result of fetch {n}"),
        description: String::new(),
        status: TaskStatus::ToDo,
        priority: TaskPriority::Low,
        due_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        assigned_to: UserId::new("u-1"),
        created_by: UserId::new("u-1"),
        attached_documents: vec![],
    }
}

// --- properties ---

proptest! {
    #[test]
    fn any_filter_change_resets_page_to_one(query in arb_query(), filter in arb_filter()) {
        let next = apply_filter(&query, &filter);
        prop_assert_eq!(next.page, 1);
        prop_assert_eq!(next.status, filter.status);
        prop_assert_eq!(next.priority, filter.priority);
        prop_assert_eq!(next.sort, filter.sort);
        prop_assert_eq!(next.limit, query.limit);
    }

    #[test]
    fn page_change_only_changes_the_page(query in arb_query(), page in 1..500u32) {
        let next = apply_page(&query, page);
        prop_assert_eq!(next.page, page);
        prop_assert_eq!(next.status, query.status);
        prop_assert_eq!(next.priority, query.priority);
        prop_assert_eq!(next.sort, query.sort);
        prop_assert_eq!(next.limit, query.limit);
    }

    /// Issue `n` fetches, complete them in an arbitrary order: the store
    /// must reflect the highest-sequence completion, no matter when the
    /// others limped in.
    #[test]
    fn store_reflects_highest_sequence_regardless_of_completion_order(
        order in (1..8usize).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let store = DomainStore::new();
        let seqs: Vec<_> = (0..order.len()).map(|_| store.issue_task_fetch()).collect();

        for &i in &order {
            store.replace_tasks(seqs[i], vec![numbered_task(i)], Pagination::default());
        }

        let winner = order.iter().copied().max().unwrap();
        let view = store.tasks();
        prop_assert_eq!(view.tasks.len(), 1);
        prop_assert_eq!(view.tasks[0].title.clone(), format!("result of fetch {winner}"));
    }

    /// Mixing failures into the completion order must not change the
    /// winner: a stale failure never clears a fresher page.
    #[test]
    fn stale_failures_never_clobber_fresher_pages(
        order in (2..8usize).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle()),
        fail_mask in prop::collection::vec(any::<bool>(), 8)
    ) {
        let store = DomainStore::new();
        let seqs: Vec<_> = (0..order.len()).map(|_| store.issue_task_fetch()).collect();

        for &i in &order {
            if fail_mask[i] {
                store.fail_tasks(seqs[i], format!("failure {i}"));
            } else {
                store.replace_tasks(seqs[i], vec![numbered_task(i)], Pagination::default());
            }
        }

        let winner = order.iter().copied().max().unwrap();
        let view = store.tasks();
        if fail_mask[winner] {
            prop_assert!(view.tasks.is_empty());
            prop_assert_eq!(view.error.clone(), Some(format!("failure {winner}")));
        } else {
            prop_assert_eq!(view.tasks[0].title.clone(), format!("result of fetch {winner}"));
        }
    }
}
