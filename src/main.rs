use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use log::{info, warn};
use pedigree_crawler::utils::logging::{create_traversal_spinner, finish_traversal_spinner};
use pedigree_crawler::utils::SyntheticPedigree;
use pedigree_crawler::{PedigreeTree, TraversalConfig, TraversalStrategy, traverse_async};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

const GENERATIONS_ENV: &str = "PEDIGREE_GENERATIONS";
const DEFAULT_GENERATIONS: u32 = 6;
const SEED: u64 = 42;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let generations = match std::env::var(GENERATIONS_ENV) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .with_context(|| format!("{GENERATIONS_ENV} must be a positive integer, got {value:?}"))?,
        Err(_) => DEFAULT_GENERATIONS,
    };

    let pedigree = SyntheticPedigree::generate(generations, SEED);
    info!(
        "Generated {generations} generations: {} families, {} persons (root {})",
        pedigree.families, pedigree.persons, pedigree.root
    );

    let config = TraversalConfig::from_env();
    let fetcher = Arc::new(pedigree.fetcher.with_latency(Duration::from_millis(20)));
    let strategies = [
        TraversalStrategy::DepthFirst,
        TraversalStrategy::BreadthFirst,
        TraversalStrategy::bounded(&config),
    ];

    let mut trees = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        let tree = Arc::new(PedigreeTree::new());
        let spinner = create_traversal_spinner(strategy);
        let report = traverse_async(
            strategy,
            Arc::clone(&fetcher),
            &pedigree.root,
            Arc::clone(&tree),
            &config,
        )
        .await?;
        finish_traversal_spinner(&spinner, &report);

        if report.families != pedigree.families || report.persons != pedigree.persons {
            warn!(
                "{strategy} retrieved {} families and {} persons, expected {} and {}",
                report.families, report.persons, pedigree.families, pedigree.persons
            );
        }
        trees.push((strategy, tree));
    }

    let (reference_strategy, reference) = &trees[0];
    for (strategy, tree) in &trees[1..] {
        if tree.family_ids() != reference.family_ids() || tree.person_ids() != reference.person_ids()
        {
            bail!("{strategy} and {reference_strategy} retrieved different pedigrees");
        }
    }
    info!("All strategies retrieved the same pedigree");

    Ok(())
}
