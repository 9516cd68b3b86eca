//! Property-based wire-format tests for the shared API types.
//!
//! Uses proptest to verify:
//! 1. Every enum survives a JSON round-trip (the wire strings carry
//!    spaces and `-` prefixes, which are easy to break in a rename).
//! 2. Query-pair rendering always carries sort/page/limit and carries a
//!    filter pair exactly when the filter is set.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;

use taskhub_api::query::{TaskQuery, TaskSort};
use taskhub_api::task::{TaskPriority, TaskStatus};

// --- strategies ---

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::ToDo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
    ]
}

fn arb_priority() -> impl Strategy<Value = TaskPriority> {
    prop_oneof![
        Just(TaskPriority::Low),
        Just(TaskPriority::Medium),
        Just(TaskPriority::High),
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
    (
        prop::option::of(arb_status()),
        prop::option::of(arb_priority()),
        arb_sort(),
        1..1000u32,
        1..100u32,
    )
        .prop_map(|(status, priority, sort, page, limit)| TaskQuery {
            status,
            priority,
            sort,
            page,
            limit,
        })
}

// --- properties ---

proptest! {
    #[test]
    fn status_round_trips_through_json(status in arb_status()) {
        let json = serde_json::to_string(&status).unwrap();
        let back: TaskStatus = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, status);
        // The wire string is the display label, spaces included.
        prop_assert_eq!(json, format!("\"{status}\""));
    }

    #[test]
    fn priority_round_trips_through_json(priority in arb_priority()) {
        let json = serde_json::to_string(&priority).unwrap();
        let back: TaskPriority = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, priority);
    }

    #[test]
    fn sort_round_trips_and_matches_its_param(sort in arb_sort()) {
        let json = serde_json::to_string(&sort).unwrap();
        let back: TaskSort = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, sort);
        prop_assert_eq!(json, format!("\"{}\"", sort.as_param()));
    }

    #[test]
    fn query_pairs_carry_fsp_invariants(query in arb_query()) {
        let pairs = query.to_query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();

        // sort/page/limit are always present, exactly once.
        for required in ["sort", "page", "limit"] {
            prop_assert_eq!(keys.iter().filter(|k| **k == required).count(), 1);
        }
        // A filter pair travels exactly when the filter is set.
        prop_assert_eq!(keys.contains(&"status"), query.status.is_some());
        prop_assert_eq!(keys.contains(&"priority"), query.priority.is_some());

        // The page pair renders the actual page number.
        let page_value = pairs.iter().find(|(k, _)| *k == "page").map(|(_, v)| v.clone());
        prop_assert_eq!(page_value, Some(query.page.to_string()));
    }
}
