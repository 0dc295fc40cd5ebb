// Hash job state
// Per-job lifecycle fields shared between the registry and session workers

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Lifecycle status of a registered job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    /// True once the job can no longer change state
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Numeric code for boundary layers.
    ///
    /// The numbering is fixed by contract:
    /// 0 = in progress (Pending or Running), 1 = Done, 2 = Failed.
    pub fn status_code(self) -> i32 {
        match self {
            JobStatus::Pending | JobStatus::Running => 0,
            JobStatus::Done => 1,
            JobStatus::Failed => 2,
        }
    }
}

/// Point-in-time copy of a job's progress fields.
///
/// Every field is owned by the snapshot; the engine keeps no alias to
/// anything handed out here.
#[derive(Debug, Clone, serde::Serialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub path: PathBuf,
    /// Hex digest, present only when status is Done
    pub digest: Option<String>,
    /// Present only when status is Failed
    pub failure_reason: Option<String>,
    pub bytes_processed: u64,
    pub bytes_total: u64,
}

/// Mutable progress fields, guarded as one unit so a snapshot can never
/// observe a half-written combination.
#[derive(Debug)]
struct JobProgress {
    status: JobStatus,
    /// Set synchronously when a session takes the job; stays set until
    /// the job is terminal. Not visible in snapshots.
    claimed: bool,
    bytes_processed: u64,
    bytes_total: u64,
    digest: Option<String>,
    failure_reason: Option<String>,
}

/// Shared state for one registered file.
///
/// The registry holds one `Arc<JobState>` per slot; the worker hashing the
/// file holds another. The worker is the sole writer of the progress
/// fields once the job is claimed.
#[derive(Debug)]
pub(crate) struct JobState {
    path: PathBuf,
    progress: Mutex<JobProgress>,
}

impl JobState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            progress: Mutex::new(JobProgress {
                status: JobStatus::Pending,
                claimed: false,
                bytes_processed: 0,
                bytes_total: 0,
                digest: None,
                failure_reason: None,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Claim the job for a session. Returns false if the job is already
    /// claimed or terminal, so a second `run_session` call never spawns a
    /// duplicate worker.
    pub fn try_claim(&self) -> bool {
        let mut progress = self.progress.lock().unwrap();
        if progress.status == JobStatus::Pending && !progress.claimed {
            progress.claimed = true;
            true
        } else {
            false
        }
    }

    /// True while a session worker owns the job and has not finished
    pub fn is_active(&self) -> bool {
        let progress = self.progress.lock().unwrap();
        progress.claimed && !progress.status.is_terminal()
    }

    pub fn status(&self) -> JobStatus {
        self.progress.lock().unwrap().status
    }

    /// Worker: the file opened successfully, record its size and go Running
    pub fn begin(&self, bytes_total: u64) {
        let mut progress = self.progress.lock().unwrap();
        progress.status = JobStatus::Running;
        progress.bytes_total = bytes_total;
    }

    /// Worker: one chunk was hashed. Clamped to bytes_total so the
    /// invariant holds even if the file grows mid-hash.
    pub fn advance(&self, chunk_bytes: u64) {
        let mut progress = self.progress.lock().unwrap();
        let next = progress.bytes_processed.saturating_add(chunk_bytes);
        progress.bytes_processed = next.min(progress.bytes_total);
    }

    /// Worker: input exhausted, digest finalized
    pub fn complete(&self, digest: String) {
        let mut progress = self.progress.lock().unwrap();
        progress.digest = Some(digest);
        progress.status = JobStatus::Done;
    }

    /// Worker: open or read failed. Progress made so far stays observable.
    pub fn fail(&self, reason: String) {
        let mut progress = self.progress.lock().unwrap();
        progress.failure_reason = Some(reason);
        progress.status = JobStatus::Failed;
    }

    /// Copy out the current progress fields
    pub fn snapshot(&self) -> JobSnapshot {
        let progress = self.progress.lock().unwrap();
        JobSnapshot {
            status: progress.status,
            path: self.path.clone(),
            digest: progress.digest.clone(),
            failure_reason: progress.failure_reason.clone(),
            bytes_processed: progress.bytes_processed,
            bytes_total: progress.bytes_total,
        }
    }
}
