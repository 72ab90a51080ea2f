//! Breadth-first traversal with bounded fetch concurrency
//!
//! Same exploration as the breadth-first strategy, but every fetcher call
//! first takes one of `max_concurrency` permits from the traversal's
//! admission gate and gives it back as soon as the call returns. Discovered
//! work always goes to the shared queue and is pulled by a fixed pool of
//! workers whose size does not depend on the cap, so a saturated gate
//! grows the queue, not the number of blocked tasks.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::task::JoinSet;

use super::Traversal;
use super::breadth_first::{enqueue_parents, process_caught, seed_queue, shut_down};
use super::queue::WorkQueue;
use super::state::{WorkState, WorkUnit};
use crate::fetch::RecordFetcher;
use crate::models::RecordId;

pub(super) async fn run<F: RecordFetcher>(
    traversal: Arc<Traversal<F>>,
    root: &RecordId,
    workers: usize,
    max_concurrency: usize,
) {
    debug_assert!(traversal.gate.is_some(), "bounded traversal needs an admission gate");
    let Some(queue) = seed_queue(&traversal, root) else {
        return;
    };

    log::debug!("Bounded traversal: {workers} workers sharing {max_concurrency} fetch permits");
    let mut pool = JoinSet::new();
    for worker in 0..workers {
        pool.spawn(worker_loop(
            Arc::clone(&traversal),
            Arc::clone(&queue),
            worker,
            max_concurrency,
        ));
    }

    shut_down(&traversal, &queue, pool).await;
}

async fn worker_loop<F: RecordFetcher>(
    traversal: Arc<Traversal<F>>,
    queue: Arc<WorkQueue<WorkUnit>>,
    worker: usize,
    max_concurrency: usize,
) {
    let mut processed = 0usize;
    while let Some(unit) = queue.pop().await {
        let family = unit.id.clone();
        let work = process_family(&traversal, &queue, unit, max_concurrency);
        process_caught(&traversal, worker, &family, work).await;
        processed += 1;
    }
    log::trace!("Bounded worker {worker} exiting after {processed} families");
}

async fn process_family<F: RecordFetcher>(
    traversal: &Traversal<F>,
    queue: &WorkQueue<WorkUnit>,
    mut unit: WorkUnit,
    max_concurrency: usize,
) {
    unit.advance(WorkState::Fetching);
    let Some(family) = traversal.fetch_family(&unit.id).await else {
        return;
    };
    unit.advance(WorkState::Expanding);

    // Person fetches stay inside this worker; the gate does the limiting
    let members = traversal.claim_members(&family);
    let persons: Vec<_> = stream::iter(members)
        .map(move |id| async move { traversal.fetch_person(&id).await })
        .buffer_unordered(max_concurrency)
        .filter_map(|person| async move { person })
        .collect()
        .await;

    enqueue_parents(traversal, queue, &unit.id, &persons);
    unit.advance(WorkState::Done);
}
