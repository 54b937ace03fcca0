//! Lock helpers shared by backends that keep in-memory bookkeeping.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutex access that survives a panicked holder.
///
/// Call history and scripted replies stay consistent between pushes, so a
/// panic in one caller must not hide them from the next.
pub trait IgnoreLock<T> {
    /// Locks, taking the guard out of a poisoned lock if needed.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnoreLock<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_recovers_after_holder_panics() {
        let prompts = Arc::new(Mutex::new(vec!["first".to_owned()]));

        let holder = Arc::clone(&prompts);
        let joined = thread::spawn(move || {
            let mut guard = holder.lock().unwrap();
            guard.push("second".to_owned());
            panic!("backend script exhausted");
        })
        .join();

        assert!(joined.is_err());
        assert!(prompts.is_poisoned());
        assert_eq!(*prompts.lock_ignore_poison(), ["first", "second"]);
    }
}
