// Session scheduler internals
// Worker execution over a digest stream, plus the in-flight gauge

use std::fs::File;
use std::io::Read;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use memmap2::Mmap;

use super::job::JobState;
use crate::digest::DigestStream;
use crate::error::EngineError;

// Files below this size are memory-mapped; larger ones (and empty ones)
// take the buffered path.
const MMAP_THRESHOLD: u64 = 2 * 1024 * 1024 * 1024; // 2GB

/// Aggregate counts over all registered jobs at one instant.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionStats {
    pub jobs_pending: usize,
    pub jobs_running: usize,
    pub jobs_done: usize,
    pub jobs_failed: usize,
    pub total_bytes_processed: u64,
}

/// Counts in-flight workers. Incremented when a session claims a job,
/// decremented when its worker reaches a terminal state; waiters sleep on
/// the condvar instead of spinning.
#[derive(Debug, Default)]
pub(crate) struct SessionGauge {
    inflight: Mutex<usize>,
    idle: Condvar,
}

impl SessionGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, workers: usize) {
        *self.inflight.lock().unwrap() += workers;
    }

    pub fn finish_one(&self) {
        let mut inflight = self.inflight.lock().unwrap();
        *inflight -= 1;
        if *inflight == 0 {
            self.idle.notify_all();
        }
    }

    pub fn count(&self) -> usize {
        *self.inflight.lock().unwrap()
    }

    /// Block until no workers are in flight
    pub fn wait_idle(&self) {
        let mut inflight = self.inflight.lock().unwrap();
        while *inflight > 0 {
            inflight = self.idle.wait(inflight).unwrap();
        }
    }

    /// Block until idle or the timeout elapses. Returns true if idle.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inflight = self.inflight.lock().unwrap();
        while *inflight > 0 {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(d) if !d.is_zero() => d,
                _ => return false,
            };
            let (guard, result) = self.idle.wait_timeout(inflight, remaining).unwrap();
            inflight = guard;
            if result.timed_out() && *inflight > 0 {
                return false;
            }
        }
        true
    }
}

/// Drive one job to a terminal state. Any error becomes the job's
/// failure_reason; nothing propagates to sibling workers.
pub(crate) fn execute_job(job: &JobState, algorithm: &str, chunk_size: usize) {
    match hash_job(job, algorithm, chunk_size) {
        Ok(digest) => job.complete(digest),
        Err(err) => job.fail(err.to_string()),
    }
}

fn hash_job(job: &JobState, algorithm: &str, chunk_size: usize) -> Result<String, EngineError> {
    let path = job.path();

    let file = File::open(path)
        .map_err(|e| EngineError::from_io_error(e, "opening", Some(path.to_path_buf())))?;
    let metadata = file
        .metadata()
        .map_err(|e| EngineError::from_io_error(e, "reading metadata of", Some(path.to_path_buf())))?;
    if !metadata.is_file() {
        return Err(EngineError::NotAFile { path: path.to_path_buf() });
    }

    let bytes_total = metadata.len();
    job.begin(bytes_total);

    let mut stream = DigestStream::new(algorithm)?;

    if bytes_total > 0 && bytes_total < MMAP_THRESHOLD {
        match unsafe { Mmap::map(&file) } {
            Ok(mmap) => {
                // Feed the map in chunk-size slices so polled progress
                // still advances per chunk.
                for chunk in mmap.chunks(chunk_size) {
                    stream.update(chunk);
                    job.advance(chunk.len() as u64);
                }
            }
            Err(_) => hash_buffered(&mut stream, file, job, chunk_size)?,
        }
    } else {
        hash_buffered(&mut stream, file, job, chunk_size)?;
    }

    Ok(stream.finalize_hex())
}

fn hash_buffered(
    stream: &mut DigestStream,
    mut file: File,
    job: &JobState,
    chunk_size: usize,
) -> Result<(), EngineError> {
    let mut buffer = vec![0u8; chunk_size];
    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| {
            EngineError::from_io_error(e, "reading", Some(job.path().to_path_buf()))
        })?;
        if bytes_read == 0 {
            break;
        }
        stream.update(&buffer[..bytes_read]);
        job.advance(bytes_read as u64);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_gauge_idle_when_empty() {
        let gauge = SessionGauge::new();
        assert_eq!(gauge.count(), 0);
        gauge.wait_idle();
        assert!(gauge.wait_idle_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_gauge_counts_down_to_idle() {
        let gauge = SessionGauge::new();
        gauge.add(2);
        assert_eq!(gauge.count(), 2);
        assert!(!gauge.wait_idle_timeout(Duration::from_millis(10)));
        gauge.finish_one();
        gauge.finish_one();
        assert_eq!(gauge.count(), 0);
        assert!(gauge.wait_idle_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_execute_job_missing_file_fails_with_reason() {
        let job = JobState::new(PathBuf::from("definitely/not/here.bin"));
        job.try_claim();
        execute_job(&job, "sha256", 1024);

        let snap = job.snapshot();
        assert_eq!(snap.status, crate::engine::JobStatus::Failed);
        assert!(!snap.failure_reason.unwrap().is_empty());
        assert_eq!(snap.bytes_processed, 0);
        assert_eq!(snap.bytes_total, 0);
    }
}
