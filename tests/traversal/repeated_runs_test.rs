use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use pedigree_crawler::utils::SyntheticPedigree;
use pedigree_crawler::{traverse_breadth_first_async, traverse_depth_first_async};

use crate::utils::{CountingFetcher, init_logging, new_tree, test_config, tree_ids};

const RUNS: usize = 100;
const MAX_DELAY: Duration = Duration::from_millis(50);

/// Breadth-first runs under random delays always build the same tree
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_breadth_first_runs_are_identical() -> pedigree_crawler::Result<()> {
    init_logging();
    let pedigree = Arc::new(SyntheticPedigree::generate(4, 2024));

    // Reference tree without any delay
    let reference_tree = new_tree();
    traverse_depth_first_async(
        Arc::new(pedigree.fetcher.clone()),
        &pedigree.root,
        Arc::clone(&reference_tree),
        &test_config(),
    )
    .await?;
    let reference = tree_ids(&reference_tree);
    assert_eq!(reference.0.len(), pedigree.families);
    assert_eq!(reference.1.len(), pedigree.persons);

    let results: Vec<_> = stream::iter(0..RUNS)
        .map(|_| {
            let pedigree = Arc::clone(&pedigree);
            async move {
                let fetcher = Arc::new(CountingFetcher::new(
                    pedigree.fetcher.clone().with_latency(MAX_DELAY),
                ));
                let tree = new_tree();
                traverse_breadth_first_async(
                    Arc::clone(&fetcher),
                    &pedigree.root,
                    Arc::clone(&tree),
                    &test_config(),
                )
                .await
                .map(|_| (tree_ids(&tree), fetcher.max_calls_per_record()))
            }
        })
        .buffer_unordered(10)
        .collect()
        .await;

    assert_eq!(results.len(), RUNS);
    for result in results {
        let (ids, max_calls) = result?;
        assert_eq!(ids, reference);
        assert_eq!(max_calls, 1);
    }
    Ok(())
}
