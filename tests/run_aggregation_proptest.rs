//! Property tests for run aggregations

mod helpers;

use proptest::prelude::*;

use baleka::database::{MemoryStore, RunRepository, Store};
use baleka::models::Run;
use baleka::query::{active_runs, RunStats};
use helpers::*;

fn arb_run() -> impl Strategy<Value = Run> {
    (
        prop_oneof![Just((3_i64, 0_i64)), Just((0, 5)), Just((8, 0)), Just((0, 9))],
        1u32..=12,
        1u32..=28,
        0.0f64..50.0,
        any::<bool>(),
    )
        .prop_map(|((event_id, route_id), month, day, distance, deleted)| {
            let mut run = test_run(1, event_id, route_id, day_2024(month, day), distance);
            run.deleted = deleted;
            run
        })
}

proptest! {
    #[test]
    fn prop_category_counts_partition_runs(runs in prop::collection::vec(arb_run(), 0..40)) {
        let active = active_runs(&runs);
        prop_assert_eq!(active.event_run_count() + active.personal_run_count(), active.run_count());
        prop_assert_eq!(active.run_count(), runs.iter().filter(|r| !r.deleted).count());
    }

    #[test]
    fn prop_window_never_exceeds_total(
        runs in prop::collection::vec(arb_run(), 0..40),
        start in 1u32..=12,
        span in 0u32..12,
    ) {
        let active = active_runs(&runs);
        let end = (start + span).min(12);
        let from = format!("2024-{:02}-01", start);
        let to = format!("2024-{:02}-28", end);

        let window = active.distance_over_time(&from, &to).unwrap();
        prop_assert!(window <= active.total_distance() + 1e-9);

        let whole_year = active.distance_over_time("2024-01-01", "2024-12-31").unwrap();
        prop_assert!((whole_year - active.total_distance()).abs() < 1e-6);
    }

    #[test]
    fn prop_repository_matches_query_engine(runs in prop::collection::vec(arb_run(), 0..20)) {
        let store = MemoryStore::new();
        insert_runs(&store, runs.clone());

        let expected = active_runs(&runs);
        let mut repository = RunRepository::new(store.session());
        let (count, total) = tokio_test::block_on(async {
            (
                repository.run_count(1).await.unwrap(),
                repository.total_distance_ran(1).await.unwrap(),
            )
        });

        prop_assert_eq!(count, expected.run_count());
        prop_assert!((total - expected.total_distance()).abs() < 1e-6);
    }
}
