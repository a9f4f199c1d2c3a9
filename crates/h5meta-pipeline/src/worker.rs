//! The per-worker driver.
//!
//! A [`Worker`] processes its share of the manifest sequentially: open one
//! container, walk it, translate its path, publish, close. One container is
//! open at a time. Per-file errors, panics included, are turned into
//! [`FileReport`]s and never stop the worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use h5meta_container::ContainerReader;
use h5meta_scan::ContainerWalker;
use h5meta_store::MetadataStore;
use tracing::{debug_span, error, info, info_span, warn};
use uuid::Uuid;

use crate::catalog::ManifestEntry;
use crate::partition::Partition;
use crate::publish::{MetadataPublisher, PublishOutcome};
use crate::summary::{FileReport, FileStatus, RunSummary};
use crate::translate::PathMapping;

/// Everything a worker needs to process manifest entries.
///
/// Shared read-only between the workers of a local run.
#[derive(Clone)]
pub struct Worker {
    reader: Arc<dyn ContainerReader>,
    walker: ContainerWalker,
    mapping: PathMapping,
    publisher: MetadataPublisher,
}

impl Worker {
    pub fn new(
        reader: Arc<dyn ContainerReader>,
        store: Arc<dyn MetadataStore>,
        mapping: PathMapping,
    ) -> Self {
        Self {
            reader,
            walker: ContainerWalker::new(),
            mapping,
            publisher: MetadataPublisher::new(store),
        }
    }

    pub fn mapping(&self) -> &PathMapping {
        &self.mapping
    }

    /// Process the entries of `catalog` owned by `partition`.
    pub fn run(&self, run_id: Uuid, catalog: &[ManifestEntry], partition: Partition) -> RunSummary {
        let span = info_span!(
            "worker",
            run = %run_id,
            index = partition.index(),
            count = partition.count()
        );
        let _enter = span.enter();

        let assigned = partition.assign(catalog);
        info!(assigned = assigned.len(), total = catalog.len(), "worker starting");

        let mut summary = RunSummary::new(run_id);
        summary.workers = 1;
        for entry in assigned {
            summary.record(self.process_guarded(entry, partition.index()));
        }

        info!(
            published = summary.published,
            partial = summary.partial,
            failed = summary.failed,
            "worker finished"
        );
        summary
    }

    /// [`Worker::process`], with a panic turned into a failed report.
    fn process_guarded(&self, entry: &ManifestEntry, worker: usize) -> FileReport {
        panic::catch_unwind(AssertUnwindSafe(|| self.process(entry, worker))).unwrap_or_else(
            |payload| {
                let message = panic_message(payload.as_ref());
                error!(
                    position = entry.position,
                    source = %entry.path,
                    panic = %message,
                    "file processing panicked"
                );
                let mut report = FileReport::failed(entry.position, worker, entry.path.clone());
                report.error = Some(format!("panicked: {message}"));
                report
            },
        )
    }

    /// Walk and publish a single manifest entry.
    pub fn process(&self, entry: &ManifestEntry, worker: usize) -> FileReport {
        let span = debug_span!("file", position = entry.position, source = %entry.path);
        let _enter = span.enter();

        let mut report = FileReport::failed(entry.position, worker, entry.path.clone());

        let container = match self.reader.open(&entry.path) {
            Ok(container) => container,
            Err(e) => {
                warn!(error = %e, "cannot open container");
                report.error = Some(e.to_string());
                return report;
            }
        };
        let record = match self.walker.walk(container.as_ref()) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "walk failed");
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.nodes = record.len();
        report.attributes = record.attribute_count();
        report.inline_failures = record.failure_count();

        let target = self.mapping.translate(&entry.path);
        report.target = Some(target.clone());
        match self.publisher.publish(&target, &record) {
            Ok(PublishOutcome::Published) => report.status = FileStatus::Published,
            Ok(PublishOutcome::Partial { error }) => {
                report.status = FileStatus::Partial;
                report.error = Some(error.to_string());
            }
            Err(e) => {
                warn!(error = %e, "publish failed");
                report.error = Some(e.to_string());
            }
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}
