// src/core/registry.rs

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::models::{ScanTask, StatusKind};

/// Per-status task counts shown in the dashboard header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub error: usize,
}

/// Client-side view of every task the backend knows about.
///
/// The backend is the source of truth: a refresh throws the old view away and
/// adopts the snapshot as-is. The only local writes are inserting a freshly
/// submitted task and updating a single task after a targeted read.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<ScanTask>,
    refreshed_at: Option<DateTime<Utc>>,
    // Sequence number of the snapshot currently applied.
    applied_seq: u64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the view with a backend snapshot.
    ///
    /// `seq` is the sequence number the refresh was issued with. A snapshot
    /// older than the one already applied is dropped and `false` is returned.
    pub fn replace(&mut self, seq: u64, snapshot: Vec<ScanTask>) -> bool {
        if seq < self.applied_seq {
            debug!(seq, applied = self.applied_seq, "Dropping out-of-order task snapshot.");
            return false;
        }

        for next in &snapshot {
            if let Some(prev) = self.get(&next.id) {
                if !prev.status.can_reach(&next.status) {
                    warn!(
                        task_id = %next.id,
                        from = %prev.status.kind(),
                        to = %next.status.kind(),
                        "Backend reported an impossible status change; adopting it anyway."
                    );
                }
            }
        }

        info!(count = snapshot.len(), seq, "Task registry refreshed.");
        self.tasks = snapshot;
        self.applied_seq = seq;
        self.refreshed_at = Some(Utc::now());
        true
    }

    /// Inserts a new task or replaces the stored copy of an existing one.
    ///
    /// `seq` is taken when the task became known locally. It counts as applied,
    /// so a snapshot requested before that point can no longer drop the task.
    pub fn upsert(&mut self, seq: u64, task: ScanTask) {
        self.applied_seq = self.applied_seq.max(seq);
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => {
                debug!(task_id = %task.id, "Adding task to registry.");
                self.tasks.push(task);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ScanTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[ScanTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn stats(&self) -> TaskStats {
        let mut stats = TaskStats { total: self.tasks.len(), ..Default::default() };
        for task in &self.tasks {
            match task.status.kind() {
                StatusKind::Pending => stats.pending += 1,
                StatusKind::Running => stats.running += 1,
                StatusKind::Completed => stats.completed += 1,
                StatusKind::Error => stats.error += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Intensity, Progress, ScanMode, TaskStatus};

    fn task(id: &str, status: TaskStatus) -> ScanTask {
        ScanTask {
            id: id.to_string(),
            target: "example.com".to_string(),
            mode: ScanMode::Black,
            intensity: Intensity::Medium,
            status,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn running(p: u8) -> TaskStatus {
        TaskStatus::Running { progress: Progress::new(p).unwrap() }
    }

    #[test]
    fn refresh_replaces_the_whole_view() {
        let mut registry = TaskRegistry::new();
        registry.upsert(1, task("local", TaskStatus::Pending));
        assert!(registry.replace(2, vec![task("1", running(10)), task("2", TaskStatus::Completed)]));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("local").is_none());
        assert!(registry.refreshed_at().is_some());
    }

    #[test]
    fn older_snapshots_are_ignored() {
        let mut registry = TaskRegistry::new();
        assert!(registry.replace(5, vec![task("1", TaskStatus::Completed)]));
        assert!(!registry.replace(4, vec![task("1", running(50))]));
        assert_eq!(registry.get("1").unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn repeated_refreshes_are_idempotent() {
        let mut registry = TaskRegistry::new();
        let snapshot = vec![task("1", running(10))];
        registry.replace(1, snapshot.clone());
        registry.replace(2, snapshot.clone());
        registry.replace(3, snapshot);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn upsert_updates_in_place() {
        let mut registry = TaskRegistry::new();
        registry.upsert(1, task("1", TaskStatus::Pending));
        registry.upsert(2, task("2", TaskStatus::Pending));
        registry.upsert(3, task("1", running(30)));
        assert_eq!(registry.tasks()[0].status, running(30));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn snapshot_requested_before_insert_cannot_drop_it() {
        let mut registry = TaskRegistry::new();
        registry.upsert(2, task("1", TaskStatus::Pending));
        assert!(!registry.replace(1, vec![]));
        assert!(registry.get("1").is_some());

        assert!(registry.replace(3, vec![task("1", running(5))]));
        assert_eq!(registry.get("1").unwrap().status, running(5));
    }

    #[test]
    fn stats_count_each_status() {
        let mut registry = TaskRegistry::new();
        registry.replace(
            1,
            vec![
                task("1", running(45)),
                task("2", TaskStatus::Completed),
                task("3", TaskStatus::Error { at_progress: Progress::new(30).unwrap() }),
                task("4", TaskStatus::Completed),
                task("5", TaskStatus::Pending),
            ],
        );
        assert_eq!(
            registry.stats(),
            TaskStats { total: 5, pending: 1, running: 1, completed: 2, error: 1 }
        );
    }
}
