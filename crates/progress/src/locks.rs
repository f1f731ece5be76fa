//! Per-project write locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use stepwise_core::types::DbId;
use tokio::sync::OwnedMutexGuard;

/// Registry of one async mutex per project.
///
/// Mutations of the same project queue on its mutex; different projects
/// proceed independently. Entries nobody holds or waits on are pruned on the
/// next acquisition.
#[derive(Debug, Default)]
pub struct ProjectLocks {
    inner: Mutex<HashMap<DbId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `project_id`.
    pub async fn lock(&self, project_id: DbId) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Only the registry holds an idle entry.
            map.retain(|id, m| *id == project_id || Arc::strong_count(m) > 1);
            Arc::clone(map.entry(project_id).or_default())
        };
        mutex.lock_owned().await
    }

    /// Drop the entry for `project_id` if it is idle.
    pub fn forget(&self, project_id: DbId) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map
            .get(&project_id)
            .is_some_and(|m| Arc::strong_count(m) == 1)
        {
            map.remove(&project_id);
        }
    }

    /// Number of projects currently tracked.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_project_is_exclusive() {
        let locks = Arc::new(ProjectLocks::new());
        let guard = locks.lock(1).await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_projects_do_not_block() {
        let locks = ProjectLocks::new();
        let _a = locks.lock(1).await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock(2))
            .await
            .expect("lock on another project should not wait");
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = ProjectLocks::new();
        drop(locks.lock(1).await);
        drop(locks.lock(2).await);
        assert_eq!(locks.len(), 1);

        locks.forget(2);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn held_entries_survive_forget() {
        let locks = ProjectLocks::new();
        let _guard = locks.lock(7).await;
        locks.forget(7);
        assert_eq!(locks.len(), 1);
    }
}
