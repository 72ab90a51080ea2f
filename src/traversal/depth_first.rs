//! Depth-first traversal
//!
//! Each family unit fetches its family, fans out one task per claimable
//! person, and once those are done spawns an independent task for every
//! newly claimed parent family. Spawned family tasks are not awaited by
//! their parent; instead every handle goes into one shared list that the
//! root drains until it stays empty. A handle is always pushed
//! before the task that spawned it finishes, so when the list is empty
//! after awaiting everything in it, the transitive closure is complete.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use super::Traversal;
use super::state::{WorkState, WorkUnit};
use crate::fetch::RecordFetcher;
use crate::models::{RecordId, RecordKind};

/// Handles of every family task spawned during one traversal
type SpawnedTasks = Arc<Mutex<Vec<JoinHandle<()>>>>;

pub(super) async fn run<F: RecordFetcher>(traversal: Arc<Traversal<F>>, root: &RecordId) {
    let Some(unit) = traversal.seed(root) else {
        return;
    };
    let spawned: SpawnedTasks = Arc::default();

    // The root runs as a task too, so a panicking fetcher never unwinds into the caller
    let root_task = tokio::spawn(process_family(
        Arc::clone(&traversal),
        Arc::clone(&spawned),
        unit,
    ));
    spawned
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(root_task);

    loop {
        let batch = std::mem::take(&mut *spawned.lock().unwrap_or_else(PoisonError::into_inner));
        if batch.is_empty() {
            break;
        }
        log::trace!("Root draining {} spawned family tasks", batch.len());
        for handle in batch {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    traversal.stats.record_failure();
                }
                log::warn!("Family task ended abnormally: {e}");
            }
        }
    }
}

fn process_family<F: RecordFetcher>(
    traversal: Arc<Traversal<F>>,
    spawned: SpawnedTasks,
    mut unit: WorkUnit,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        unit.advance(WorkState::Fetching);
        let Some(family) = traversal.fetch_family(&unit.id).await else {
            return;
        };
        unit.advance(WorkState::Expanding);

        let person_tasks: Vec<_> = traversal
            .claim_members(&family)
            .into_iter()
            .map(|person_id| {
                let traversal = Arc::clone(&traversal);
                tokio::spawn(async move { traversal.fetch_person(&person_id).await })
            })
            .collect();

        let mut persons = Vec::with_capacity(person_tasks.len());
        for task in person_tasks {
            match task.await {
                Ok(Some(person)) => persons.push(person),
                Ok(None) => {}
                Err(e) => {
                    if e.is_panic() {
                        traversal.stats.record_failure();
                    }
                    log::warn!("Person task for family {} failed: {e}", unit.id);
                }
            }
        }

        for parent in traversal.claim_parent_families(&unit.id, &persons) {
            let parent_unit = WorkUnit::family(parent, traversal.tracker.begin());
            let handle = tokio::spawn(process_family(
                Arc::clone(&traversal),
                Arc::clone(&spawned),
                parent_unit,
            ));
            spawned
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(handle);
        }

        log::trace!(
            "Finished {} {}{}",
            RecordKind::Family,
            unit.id,
            if unit.is_root { " (root)" } else { "" }
        );
        unit.advance(WorkState::Done);
    })
}
