use super::domain::TaskSet;
use super::loader::SourceId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Cache of normalized task sets keyed by source. Entries are write-once: inserting
/// for a source that is already present keeps and returns the stored set.
pub trait TaskSetStore: Send + Sync {
    fn get(&self, source: &SourceId) -> Option<Arc<TaskSet>>;
    fn insert(&self, source: SourceId, tasks: TaskSet) -> Arc<TaskSet>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskSetStore {
    entries: Arc<Mutex<HashMap<SourceId, Arc<TaskSet>>>>,
}

impl InMemoryTaskSetStore {
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskSetStore for InMemoryTaskSetStore {
    fn get(&self, source: &SourceId) -> Option<Arc<TaskSet>> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(source).cloned()
    }

    fn insert(&self, source: SourceId, tasks: TaskSet) -> Arc<TaskSet> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(source)
            .or_insert_with(|| Arc::new(tasks))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::domain::fixtures::task;
    use crate::tasks::domain::TaskStatus;

    #[test]
    fn first_insert_wins() {
        let store = InMemoryTaskSetStore::default();
        let source = SourceId::new("data/tracker.csv");

        let first = store.insert(
            source.clone(),
            TaskSet::new(vec![task(1, TaskStatus::Completed, 100)]),
        );
        let second = store.insert(
            source.clone(),
            TaskSet::new(vec![task(2, TaskStatus::NotStarted, 0)]),
        );

        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.get(&source).expect("cached").find(1).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let store = InMemoryTaskSetStore::default();
        let handle = store.clone();
        handle.insert(SourceId::new("a.csv"), TaskSet::default());

        assert!(store.get(&SourceId::new("a.csv")).is_some());
        assert!(store.get(&SourceId::new("b.csv")).is_none());
    }
}
