//! Launching workers.
//!
//! A run either executes one externally coordinated worker (the surrounding
//! launcher starts one process per worker and hands each its index and
//! count) or runs every worker locally as a named OS thread.

use std::sync::Arc;
use std::thread;

use tracing::info;
use uuid::Uuid;

use crate::catalog::ManifestEntry;
use crate::error::{PipelineError, PipelineResult};
use crate::partition::Partition;
use crate::summary::RunSummary;
use crate::worker::Worker;

/// Run the single worker identified by `partition`.
pub fn run_coordinated(
    worker: &Worker,
    catalog: Arc<[ManifestEntry]>,
    partition: Partition,
) -> RunSummary {
    let run_id = Uuid::now_v7();
    info!(run = %run_id, partition = %partition, files = catalog.len(), "coordinated run");
    worker.run(run_id, &catalog, partition)
}

/// Run `workers` workers on local threads and merge their summaries.
pub fn run_local(
    worker: &Worker,
    catalog: Arc<[ManifestEntry]>,
    workers: usize,
) -> PipelineResult<RunSummary> {
    let partitions = Partition::all(workers)?;
    let run_id = Uuid::now_v7();
    info!(run = %run_id, workers, files = catalog.len(), "local run");

    let summaries = thread::scope(|scope| -> PipelineResult<Vec<RunSummary>> {
        let mut handles = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let catalog = Arc::clone(&catalog);
            let index = partition.index();
            let handle = thread::Builder::new()
                .name(format!("h5meta-worker-{index}"))
                .spawn_scoped(scope, move || worker.run(run_id, &catalog, partition))
                .map_err(|source| PipelineError::Spawn { index, source })?;
            handles.push((index, handle));
        }
        handles
            .into_iter()
            .map(|(index, handle)| {
                handle
                    .join()
                    .map_err(|_| PipelineError::WorkerPanicked { index })
            })
            .collect::<PipelineResult<Vec<_>>>()
    })?;

    let mut total = RunSummary::new(run_id);
    for summary in summaries {
        total.merge(summary);
    }
    info!(
        published = total.published,
        partial = total.partial,
        failed = total.failed,
        "run finished"
    );
    Ok(total)
}
