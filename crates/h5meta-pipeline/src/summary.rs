use serde::Serialize;
use uuid::Uuid;

/// Final state of one manifest entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Published,
    /// The entry exists in the store but its metadata is missing.
    Partial,
    Failed,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// What happened to one manifest entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub position: usize,
    pub worker: usize,
    pub source: String,
    /// Store path; absent when the file failed before translation.
    pub target: Option<String>,
    pub status: FileStatus,
    pub nodes: usize,
    pub attributes: usize,
    /// Node and attribute failures recorded inline during the walk.
    pub inline_failures: usize,
    pub error: Option<String>,
}

impl FileReport {
    /// A report for `source` that has not got past opening.
    pub fn failed(position: usize, worker: usize, source: impl Into<String>) -> Self {
        Self {
            position,
            worker,
            source: source.into(),
            target: None,
            status: FileStatus::Failed,
            nodes: 0,
            attributes: 0,
            inline_failures: 0,
            error: None,
        }
    }
}

/// Counts and per-file reports of a run, or of one worker's share of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub workers: usize,
    pub published: usize,
    pub partial: usize,
    pub failed: usize,
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            workers: 0,
            published: 0,
            partial: 0,
            failed: 0,
            reports: Vec::new(),
        }
    }

    pub fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::Published => self.published += 1,
            FileStatus::Partial => self.partial += 1,
            FileStatus::Failed => self.failed += 1,
        }
        self.reports.push(report);
    }

    /// Fold another worker's summary into this one.
    ///
    /// Reports are kept in manifest order.
    pub fn merge(&mut self, other: RunSummary) {
        self.workers += other.workers;
        self.published += other.published;
        self.partial += other.partial;
        self.failed += other.failed;
        self.reports.extend(other.reports);
        self.reports.sort_by_key(|r| r.position);
    }

    pub fn total(&self) -> usize {
        self.published + self.partial + self.failed
    }

    /// Whether every file was fully published.
    pub fn is_clean(&self) -> bool {
        self.partial == 0 && self.failed == 0
    }

    pub fn inline_failures(&self) -> usize {
        self.reports.iter().map(|r| r.inline_failures).sum()
    }

    /// Positions handled by `worker`, in processing order.
    pub fn positions_of(&self, worker: usize) -> Vec<usize> {
        self.reports
            .iter()
            .filter(|r| r.worker == worker)
            .map(|r| r.position)
            .collect()
    }
}
