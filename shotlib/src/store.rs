use crate::job::{Job, JobSnapshot};
use crate::types::JobId;
use std::collections::HashMap;

/// Mapping from job id to job record.
///
/// The coordinator actor is the only writer, so implementations need no
/// synchronization of their own. Ids are assigned by the coordinator and
/// never reused.
pub trait JobStore: Send {
    fn insert(&mut self, job: Job);
    fn get(&self, id: JobId) -> Option<&Job>;
    fn get_mut(&mut self, id: JobId) -> Option<&mut Job>;
    /// Snapshots of every job, most recently created first.
    fn snapshots(&self) -> Vec<JobSnapshot>;
}

#[derive(Default)]
pub struct MemoryStore {
    jobs: HashMap<JobId, Job>,
    // insertion order, oldest first
    order: Vec<JobId>,
}

impl JobStore for MemoryStore {
    fn insert(&mut self, job: Job) {
        self.order.push(job.id);
        self.jobs.insert(job.id, job);
    }

    fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.get_mut(&id)
    }

    fn snapshots(&self) -> Vec<JobSnapshot> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.jobs.get(id))
            .map(Job::snapshot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use uuid::Uuid;

    #[test]
    fn snapshots_are_newest_first() {
        let mut store = MemoryStore::default();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        store.insert(Job::new(first, "https://a.example".into(), None));
        store.insert(Job::new(second, "https://b.example".into(), None));

        let snapshots = store.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].job_id, second);
        assert_eq!(snapshots[1].job_id, first);
    }

    #[test]
    fn mutation_through_get_mut_is_visible() {
        let mut store = MemoryStore::default();
        let id = Uuid::new_v4();
        store.insert(Job::new(id, "https://a.example".into(), None));

        store
            .get_mut(id)
            .expect("job should exist")
            .status = JobStatus::Pending;
        assert_eq!(store.get(id).expect("job should exist").status, JobStatus::Pending);
    }
}
