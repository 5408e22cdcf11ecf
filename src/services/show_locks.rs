use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per show, so admission for a show is serialized inside
/// this process while bookings for different shows proceed in parallel.
///
/// The conditional insert in the booking repository already keeps the
/// capacity invariant at the storage layer; this lock additionally makes the
/// follow-up "why was it rejected" reads consistent with the insert attempt.
#[derive(Clone, Default)]
pub struct ShowLocks {
    locks: Arc<Mutex<HashMap<i32, Arc<Mutex<()>>>>>,
}

impl ShowLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `show_id`. The lock is released when
    /// the guard is dropped.
    pub async fn acquire(&self, show_id: i32) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(show_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops the entry for a deleted show unless someone is still using it.
    pub async fn forget(&self, show_id: i32) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(&show_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&show_id);
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_show_is_exclusive() {
        let locks = ShowLocks::new();
        let guard = locks.acquire(1).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.acquire(1).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        waiting.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_shows_do_not_block() {
        let locks = ShowLocks::new();
        let _first = locks.acquire(1).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_forget_keeps_held_locks() {
        let locks = ShowLocks::new();
        let guard = locks.acquire(7).await;
        locks.forget(7).await;
        assert_eq!(locks.len().await, 1);

        drop(guard);
        locks.forget(7).await;
        assert_eq!(locks.len().await, 0);
    }
}
