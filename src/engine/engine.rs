// Engine facade
// Explicit engine instance: registry + session scheduler + progress surface

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::job::{JobSnapshot, JobStatus};
use super::registry::{JobHandle, JobTable};
use super::session::{self, SessionGauge, SessionStats};
use crate::digest::DigestRegistry;
use crate::error::EngineError;

const DEFAULT_ALGORITHM: &str = "sha256";
const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024; // 1MB

/// Concurrent file-hashing engine.
///
/// Callers register files, start a session, and poll per-job progress
/// until every job is Done or Failed. No method blocks on another job's
/// completion except the explicit `wait_idle` helpers. Engines are
/// independent instances; creating several isolated ones is cheap.
pub struct HashEngine {
    algorithm: String,
    chunk_size: usize,
    table: Mutex<JobTable>,
    gauge: Arc<SessionGauge>,
}

impl HashEngine {
    /// Create an engine hashing with SHA-256
    pub fn new() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            table: Mutex::new(JobTable::new()),
            gauge: Arc::new(SessionGauge::new()),
        }
    }

    /// Create an engine for the named algorithm.
    /// Fails with `UnsupportedAlgorithm` for names the registry lacks.
    pub fn with_algorithm(algorithm: &str) -> Result<Self, EngineError> {
        // Validate up front so workers can't hit an unknown name later
        DigestRegistry::hasher_for(algorithm)?;
        let mut engine = Self::new();
        engine.algorithm = algorithm.to_lowercase();
        Ok(engine)
    }

    /// Set the streaming chunk size (bytes_processed advances per chunk)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(4096);
        self
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Register a file for hashing. The job starts Pending with zero
    /// progress; nothing touches the file system until a session runs.
    pub fn add_file(&self, path: impl AsRef<Path>) -> Result<JobHandle, EngineError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(EngineError::InvalidPath { path: path.to_path_buf() });
        }
        let mut table = self.table.lock().unwrap();
        Ok(table.add(path.to_path_buf()))
    }

    /// Owned copy of the job's path
    pub fn file_path(&self, handle: JobHandle) -> Result<PathBuf, EngineError> {
        let table = self.table.lock().unwrap();
        Ok(table.get(handle)?.path().to_path_buf())
    }

    /// Remove one job. Rejects with `JobBusy` while a session worker owns
    /// it; afterwards the handle is stale and lookups fail.
    pub fn remove_file(&self, handle: JobHandle) -> Result<(), EngineError> {
        let mut table = self.table.lock().unwrap();
        table.remove(handle)
    }

    /// Number of jobs currently registered
    pub fn file_count(&self) -> usize {
        let table = self.table.lock().unwrap();
        table.count()
    }

    /// Remove all jobs. Rejects with `SessionActive` while any worker is
    /// outstanding; on rejection no job is removed.
    pub fn clear_files(&self) -> Result<(), EngineError> {
        let mut table = self.table.lock().unwrap();
        table.clear()
    }

    /// Launch one worker per Pending job on the shared rayon pool and
    /// return the number launched.
    ///
    /// Idempotent with respect to active work: calling this again while a
    /// prior session's workers are outstanding claims only jobs still
    /// Pending and never doubles up on a claimed job. Jobs are claimed
    /// before this method returns, so `remove_file`/`clear_files` guards
    /// take effect immediately.
    pub fn run_session(&self) -> usize {
        let claimed: Vec<_> = {
            let table = self.table.lock().unwrap();
            table.jobs().filter(|job| job.try_claim()).cloned().collect()
        };

        self.gauge.add(claimed.len());
        let launched = claimed.len();

        for job in claimed {
            let gauge = Arc::clone(&self.gauge);
            let algorithm = self.algorithm.clone();
            let chunk_size = self.chunk_size;
            rayon::spawn(move || {
                session::execute_job(&job, &algorithm, chunk_size);
                gauge.finish_one();
            });
        }

        launched
    }

    /// Number of in-flight workers at this instant; a momentary snapshot,
    /// not a guarantee about the next one
    pub fn running_count(&self) -> usize {
        self.gauge.count()
    }

    /// Point-in-time copy of one job's progress. Never blocks on worker
    /// progress and never observes a partially written update.
    pub fn progress(&self, handle: JobHandle) -> Result<JobSnapshot, EngineError> {
        let job = {
            let table = self.table.lock().unwrap();
            Arc::clone(table.get(handle)?)
        };
        Ok(job.snapshot())
    }

    /// Aggregate counts over all registered jobs
    pub fn session_stats(&self) -> SessionStats {
        let snapshots: Vec<_> = {
            let table = self.table.lock().unwrap();
            table.jobs().map(|job| job.snapshot()).collect()
        };

        let mut stats = SessionStats {
            jobs_pending: 0,
            jobs_running: 0,
            jobs_done: 0,
            jobs_failed: 0,
            total_bytes_processed: 0,
        };
        for snap in snapshots {
            match snap.status {
                JobStatus::Pending => stats.jobs_pending += 1,
                JobStatus::Running => stats.jobs_running += 1,
                JobStatus::Done => stats.jobs_done += 1,
                JobStatus::Failed => stats.jobs_failed += 1,
            }
            stats.total_bytes_processed += snap.bytes_processed;
        }
        stats
    }

    /// Block until no workers are in flight (condvar wait, not polling)
    pub fn wait_idle(&self) {
        self.gauge.wait_idle();
    }

    /// Block until idle or the timeout elapses. Returns true if idle.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        self.gauge.wait_idle_timeout(timeout)
    }
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new()
    }
}
