//! Breadth-first traversal
//!
//! A fixed pool of workers pulls family units from a shared queue. A worker
//! fetches the family, fetches its claimable persons concurrently, and
//! enqueues every newly claimed parent family before it lets go of the
//! unit it is working on. The coordinator waits on the termination tracker
//! rather than on the queue, closes the queue once nothing is
//! outstanding, and then joins the pool.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use tokio::task::JoinSet;

use super::Traversal;
use super::queue::WorkQueue;
use super::state::{WorkState, WorkUnit};
use crate::fetch::RecordFetcher;
use crate::models::{PersonRecord, RecordId};

pub(super) async fn run<F: RecordFetcher>(
    traversal: Arc<Traversal<F>>,
    root: &RecordId,
    workers: usize,
) {
    let Some(queue) = seed_queue(&traversal, root) else {
        return;
    };

    let mut pool = JoinSet::new();
    for worker in 0..workers {
        pool.spawn(worker_loop(Arc::clone(&traversal), Arc::clone(&queue), worker));
    }

    shut_down(&traversal, &queue, pool).await;
}

/// Claim the root and put it on a fresh queue
pub(super) fn seed_queue<F: RecordFetcher>(
    traversal: &Traversal<F>,
    root: &RecordId,
) -> Option<Arc<WorkQueue<WorkUnit>>> {
    let unit = traversal.seed(root)?;
    let queue = Arc::new(WorkQueue::new());
    queue.push(unit);
    Some(queue)
}

/// Wait for convergence, then stop and join the worker pool
pub(super) async fn shut_down<F: RecordFetcher>(
    traversal: &Traversal<F>,
    queue: &WorkQueue<WorkUnit>,
    mut pool: JoinSet<()>,
) {
    traversal.tracker.wait_idle().await;
    debug_assert!(queue.is_empty());
    queue.close();

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            log::warn!("Traversal worker ended abnormally: {e}");
        }
    }
}

/// Process one unit on a pool worker, surviving a panic in the fetcher
///
/// The panicked unit is abandoned like a failed fetch; its guard is
/// released while unwinding and the worker goes on to the next unit.
pub(super) async fn process_caught<F: RecordFetcher>(
    traversal: &Traversal<F>,
    worker: usize,
    family: &RecordId,
    work: impl Future<Output = ()>,
) {
    if let Err(panic) = AssertUnwindSafe(work).catch_unwind().await {
        traversal.stats.record_failure();
        log::warn!(
            "Worker {worker} abandoned family {family} after a panic: {}",
            panic_message(panic.as_ref())
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Enqueue the newly claimed parent families of the given persons
pub(super) fn enqueue_parents<F: RecordFetcher>(
    traversal: &Traversal<F>,
    queue: &WorkQueue<WorkUnit>,
    family: &RecordId,
    persons: &[Arc<PersonRecord>],
) {
    for parent in traversal.claim_parent_families(family, persons) {
        log::debug!("Enqueueing family {parent}");
        queue.push(WorkUnit::family(parent, traversal.tracker.begin()));
    }
}

async fn worker_loop<F: RecordFetcher>(
    traversal: Arc<Traversal<F>>,
    queue: Arc<WorkQueue<WorkUnit>>,
    worker: usize,
) {
    let mut processed = 0usize;
    while let Some(unit) = queue.pop().await {
        let family = unit.id.clone();
        let work = process_family(&traversal, &queue, unit);
        process_caught(&traversal, worker, &family, work).await;
        processed += 1;
    }
    log::trace!("Worker {worker} exiting after {processed} families");
}

async fn process_family<F: RecordFetcher>(
    traversal: &Traversal<F>,
    queue: &WorkQueue<WorkUnit>,
    mut unit: WorkUnit,
) {
    unit.advance(WorkState::Fetching);
    let Some(family) = traversal.fetch_family(&unit.id).await else {
        return;
    };
    unit.advance(WorkState::Expanding);

    let members = traversal.claim_members(&family);
    let fetches = members
        .into_iter()
        .map(move |id| async move { traversal.fetch_person(&id).await });
    let persons: Vec<_> = join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .collect();

    enqueue_parents(traversal, queue, &unit.id, &persons);
    // Children are counted; only now may this unit stop being outstanding
    unit.advance(WorkState::Done);
}
