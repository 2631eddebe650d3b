use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local registry of Run ids currently being executed.
#[derive(Debug, Clone, Default)]
pub struct ExecutionGuard {
    in_flight: Arc<Mutex<HashSet<i32>>>,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<i32>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claims the Run id. `None` when another execution already holds it.
    pub fn try_acquire(&self, run_id: i32) -> Option<ExecutionPermit> {
        if !self.lock().insert(run_id) {
            return None;
        }
        Some(ExecutionPermit {
            run_id,
            guard: self.clone(),
        })
    }

    pub fn is_running(&self, run_id: i32) -> bool {
        self.lock().contains(&run_id)
    }
}

/// Releases its Run id when dropped.
#[derive(Debug)]
pub struct ExecutionPermit {
    run_id: i32,
    guard: ExecutionGuard,
}

impl ExecutionPermit {
    pub fn run_id(&self) -> i32 {
        self.run_id
    }
}

impl Drop for ExecutionPermit {
    fn drop(&mut self) {
        self.guard.lock().remove(&self.run_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused_until_release() {
        let guard = ExecutionGuard::new();

        let permit = guard.try_acquire(7).unwrap();
        assert_eq!(permit.run_id(), 7);
        assert!(guard.is_running(7));
        assert!(guard.try_acquire(7).is_none());
        assert!(guard.try_acquire(8).is_some());

        drop(permit);
        assert!(!guard.is_running(7));
        assert!(guard.try_acquire(7).is_some());
    }
}
