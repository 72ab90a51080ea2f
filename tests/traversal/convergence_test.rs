use std::sync::Arc;
use std::time::Duration;

use pedigree_crawler::utils::SyntheticPedigree;
use pedigree_crawler::{
    FamilyRecord, InMemoryFetcher, PersonRecord, RecordId, RecordKind, TraversalStrategy,
    traverse_async,
};

use crate::utils::{
    CountingFetcher, TEST_LATENCY, cyclic, init_logging, new_tree, test_config, three_generations,
    tree_ids, wide_family,
};

const STRATEGIES: [TraversalStrategy; 3] = [
    TraversalStrategy::DepthFirst,
    TraversalStrategy::BreadthFirst,
    TraversalStrategy::Bounded { max_concurrency: 5 },
];

/// Every record of a complete pedigree is fetched exactly once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_record_fetched_exactly_once() -> pedigree_crawler::Result<()> {
    init_logging();
    let pedigree = SyntheticPedigree::generate(5, 11);

    for strategy in STRATEGIES {
        let fetcher = Arc::new(CountingFetcher::new(
            pedigree.fetcher.clone().with_latency(TEST_LATENCY),
        ));
        let tree = new_tree();
        let report = traverse_async(
            strategy,
            Arc::clone(&fetcher),
            &pedigree.root,
            Arc::clone(&tree),
            &test_config(),
        )
        .await?;

        assert_eq!(fetcher.max_calls_per_record(), 1, "{strategy}");
        assert_eq!(fetcher.total_calls(), pedigree.families + pedigree.persons);
        assert_eq!(tree.family_count(), pedigree.families, "{strategy}");
        assert_eq!(tree.person_count(), pedigree.persons, "{strategy}");
        assert_eq!(report.stats.total_fetches(), fetcher.total_calls());
        assert_eq!(report.stats.fetch_failures, 0);
    }
    Ok(())
}

/// All strategies retrieve the same records from the same root
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_strategies_converge_to_same_tree() -> pedigree_crawler::Result<()> {
    init_logging();
    let fetcher = Arc::new(three_generations().with_latency(TEST_LATENCY));
    let root = RecordId::new("F1");

    let mut results = Vec::new();
    for strategy in STRATEGIES {
        let tree = new_tree();
        traverse_async(strategy, Arc::clone(&fetcher), &root, Arc::clone(&tree), &test_config())
            .await?;
        results.push(tree_ids(&tree));
    }

    let (families, persons) = &results[0];
    assert_eq!(families.len(), 4);
    assert_eq!(persons.len(), 10);
    assert!(results.iter().all(|ids| ids == &results[0]));
    Ok(())
}

/// The unknown wife of F3 is never fetched, and P9's empty parent link ends
/// that branch
#[tokio::test]
async fn test_sentinel_links_are_not_followed() -> pedigree_crawler::Result<()> {
    let fetcher = Arc::new(CountingFetcher::new(three_generations()));
    let tree = new_tree();
    let report = traverse_async(
        TraversalStrategy::BreadthFirst,
        Arc::clone(&fetcher),
        &RecordId::new("F1"),
        Arc::clone(&tree),
        &test_config(),
    )
    .await?;

    assert_eq!(fetcher.calls(RecordKind::Person, "0"), 0);
    assert_eq!(fetcher.calls(RecordKind::Family, "0"), 0);
    assert_eq!(fetcher.calls(RecordKind::Family, ""), 0);
    assert!(report.stats.sentinel_links > 0);
    assert_eq!(report.stats.absent_records, 0);
    Ok(())
}

/// Cyclic data terminates and still fetches each record once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycles_terminate() -> pedigree_crawler::Result<()> {
    init_logging();
    let root = RecordId::new("F1");
    let config = test_config();
    for strategy in STRATEGIES {
        let fetcher = Arc::new(CountingFetcher::new(cyclic().with_latency(TEST_LATENCY)));
        let tree = new_tree();
        let traversal = traverse_async(
            strategy,
            Arc::clone(&fetcher),
            &root,
            Arc::clone(&tree),
            &config,
        );
        let report = tokio::time::timeout(Duration::from_secs(10), traversal)
            .await
            .expect("traversal of cyclic data did not terminate")?;

        assert_eq!(tree.family_count(), 2, "{strategy}");
        assert_eq!(tree.person_count(), 5, "{strategy}");
        assert_eq!(fetcher.max_calls_per_record(), 1, "{strategy}");
        assert!(report.stats.duplicate_claims > 0);
    }
    Ok(())
}

/// Children linking back to the family being expanded are not duplicate
/// claims; only persons shared between families are
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_duplicate_claims_count_shared_persons() -> pedigree_crawler::Result<()> {
    let root = RecordId::new("W");
    for strategy in STRATEGIES {
        let report = traverse_async(
            strategy,
            Arc::new(wide_family(5)),
            &root,
            new_tree(),
            &test_config(),
        )
        .await?;
        assert_eq!(report.persons, 7, "{strategy}");
        assert_eq!(report.stats.duplicate_claims, 0, "{strategy}");
    }

    // P1, P2 and P5 are each listed in their own family and their parents'
    let root = RecordId::new("F1");
    for strategy in STRATEGIES {
        let report = traverse_async(
            strategy,
            Arc::new(three_generations()),
            &root,
            new_tree(),
            &test_config(),
        )
        .await?;
        assert_eq!(report.stats.duplicate_claims, 3, "{strategy}");
    }
    Ok(())
}

/// A family with a missing husband, an empty wife link and no children
#[tokio::test]
async fn test_family_of_sentinels() -> pedigree_crawler::Result<()> {
    let mut fetcher = InMemoryFetcher::new();
    fetcher.add_family(FamilyRecord::new("F1").with_wife(""));

    for strategy in STRATEGIES {
        let fetcher = Arc::new(CountingFetcher::new(fetcher.clone()));
        let tree = new_tree();
        let report = traverse_async(
            strategy,
            Arc::clone(&fetcher),
            &RecordId::new("F1"),
            Arc::clone(&tree),
            &test_config(),
        )
        .await?;

        assert_eq!(tree.family_count(), 1);
        assert!(tree.get_family(&RecordId::new("F1")).is_some());
        assert_eq!(tree.person_count(), 0);
        assert_eq!(fetcher.total_calls(), 1);
        assert_eq!(report.stats.sentinel_links, 2);
    }
    Ok(())
}

/// A sentinel root is a no-op
#[tokio::test]
async fn test_sentinel_root() -> pedigree_crawler::Result<()> {
    for root in ["0", "", "  "] {
        let fetcher = Arc::new(CountingFetcher::new(three_generations()));
        let tree = new_tree();
        let report = traverse_async(
            TraversalStrategy::DepthFirst,
            Arc::clone(&fetcher),
            &RecordId::new(root),
            Arc::clone(&tree),
            &test_config(),
        )
        .await?;

        assert!(tree.is_empty());
        assert_eq!(fetcher.total_calls(), 0);
        assert_eq!(report.families, 0);
    }
    Ok(())
}

/// A root the service does not know leaves the tree empty
#[tokio::test]
async fn test_unknown_root() -> pedigree_crawler::Result<()> {
    let fetcher = Arc::new(three_generations());
    let tree = new_tree();
    let report = traverse_async(
        TraversalStrategy::BreadthFirst,
        fetcher,
        &RecordId::new("F404"),
        Arc::clone(&tree),
        &test_config(),
    )
    .await?;

    assert!(tree.is_empty());
    assert_eq!(report.stats.absent_records, 1);
    Ok(())
}

/// Records already in the tree are kept; the traversal still completes
#[tokio::test]
async fn test_prefilled_tree_is_kept() -> pedigree_crawler::Result<()> {
    let tree = new_tree();
    let original = Arc::new(PersonRecord::new("P3", "Already known"));
    tree.add_person(Arc::clone(&original));

    traverse_async(
        TraversalStrategy::DepthFirst,
        Arc::new(three_generations()),
        &RecordId::new("F1"),
        Arc::clone(&tree),
        &test_config(),
    )
    .await?;

    assert_eq!(tree.person_count(), 10);
    let kept = tree.get_person(&RecordId::new("P3")).unwrap();
    assert!(Arc::ptr_eq(&kept, &original));
    Ok(())
}
