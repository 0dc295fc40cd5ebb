// Job registry
// Generational slot table: stale handles are detected, never re-aliased

use std::path::PathBuf;
use std::sync::Arc;

use super::job::JobState;
use crate::error::EngineError;

/// Caller-visible identifier for one registered job.
///
/// A handle is valid from registration until the job is removed or the
/// registry is cleared. Each slot carries a generation tag that is bumped
/// on removal, so a stale handle fails with `IndexOutOfRange` instead of
/// silently addressing whichever job later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct JobHandle {
    index: u32,
    generation: u32,
}

impl JobHandle {
    /// Slot index, assigned in insertion order (reused after removal)
    pub fn index(self) -> u32 {
        self.index
    }

    /// Pack into a single u64 for boundary layers: generation in the high
    /// 32 bits, index in the low 32 bits.
    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Inverse of `to_raw`. The result is only meaningful if the raw value
    /// came from `to_raw`; lookups with a forged handle still fail safely.
    pub fn from_raw(raw: u64) -> Self {
        Self {
            index: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    job: Option<Arc<JobState>>,
}

/// Ordered collection of jobs addressed by stable handles.
///
/// Structural mutation requires `&mut self`; the engine serializes that
/// through one mutex. Progress fields inside each job have their own lock,
/// so workers never touch the table.
#[derive(Debug, Default)]
pub(crate) struct JobTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    occupied: usize,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new Pending job and return its handle
    pub fn add(&mut self, path: PathBuf) -> JobHandle {
        let job = Arc::new(JobState::new(path));
        self.occupied += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.job = Some(job);
                JobHandle { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, job: Some(job) });
                JobHandle { index, generation: 0 }
            }
        }
    }

    /// Look up a live job. Unknown indices, vacated slots, and stale
    /// generations all fail the same way.
    pub fn get(&self, handle: JobHandle) -> Result<&Arc<JobState>, EngineError> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.job.as_ref())
            .ok_or(EngineError::IndexOutOfRange { index: handle.index })
    }

    /// Remove the job at the handle. Rejects with `JobBusy` while a
    /// session worker owns the job; a worker is never signaled to abandon.
    pub fn remove(&mut self, handle: JobHandle) -> Result<(), EngineError> {
        if self.get(handle)?.is_active() {
            return Err(EngineError::JobBusy { index: handle.index });
        }
        let slot = &mut self.slots[handle.index as usize];
        slot.job = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.occupied -= 1;
        Ok(())
    }

    /// Number of jobs currently registered
    pub fn count(&self) -> usize {
        self.occupied
    }

    /// Remove all jobs. Rejects with `SessionActive` if any job is still
    /// owned by a worker; on rejection nothing is removed.
    pub fn clear(&mut self) -> Result<(), EngineError> {
        let active = self.jobs().filter(|job| job.is_active()).count();
        if active > 0 {
            return Err(EngineError::SessionActive { active });
        }
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.job.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        // Reuse low indices first after a clear
        self.free.reverse();
        self.occupied = 0;
        Ok(())
    }

    /// Iterate over all live jobs
    pub fn jobs(&self) -> impl Iterator<Item = &Arc<JobState>> {
        self.slots.iter().filter_map(|slot| slot.job.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_slot_reuse_invalidates_old_handle() {
        let mut table = JobTable::new();
        let a = table.add(PathBuf::from("a.txt"));
        let b = table.add(PathBuf::from("b.txt"));
        table.remove(a).unwrap();

        // New job lands in the freed slot but under a new generation
        let c = table.add(PathBuf::from("c.txt"));
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);

        assert!(matches!(
            table.get(a),
            Err(EngineError::IndexOutOfRange { .. })
        ));
        assert_eq!(table.get(c).unwrap().path(), Path::new("c.txt"));
        assert_eq!(table.get(b).unwrap().path(), Path::new("b.txt"));
    }

    #[test]
    fn test_remove_rejects_claimed_job() {
        let mut table = JobTable::new();
        let a = table.add(PathBuf::from("a.txt"));
        assert!(table.get(a).unwrap().try_claim());

        assert!(matches!(table.remove(a), Err(EngineError::JobBusy { .. })));
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn test_clear_rejects_while_active_and_removes_nothing() {
        let mut table = JobTable::new();
        let a = table.add(PathBuf::from("a.txt"));
        let b = table.add(PathBuf::from("b.txt"));
        table.get(a).unwrap().try_claim();

        assert!(matches!(
            table.clear(),
            Err(EngineError::SessionActive { active: 1 })
        ));
        assert_eq!(table.count(), 2);
        assert!(table.get(b).is_ok());
    }

    #[test]
    fn test_clear_invalidates_all_handles() {
        let mut table = JobTable::new();
        let a = table.add(PathBuf::from("a.txt"));
        let b = table.add(PathBuf::from("b.txt"));
        table.clear().unwrap();

        assert_eq!(table.count(), 0);
        assert!(table.get(a).is_err());
        assert!(table.get(b).is_err());

        // Slots are reusable afterwards
        let c = table.add(PathBuf::from("c.txt"));
        assert!(table.get(c).is_ok());
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn test_handle_raw_round_trip() {
        let mut table = JobTable::new();
        table.add(PathBuf::from("a.txt"));
        let mut b = table.add(PathBuf::from("b.txt"));
        table.remove(b).unwrap();
        b = table.add(PathBuf::from("b2.txt"));

        let raw = b.to_raw();
        assert_eq!(JobHandle::from_raw(raw), b);
        assert!(table.get(JobHandle::from_raw(raw)).is_ok());
    }
}
