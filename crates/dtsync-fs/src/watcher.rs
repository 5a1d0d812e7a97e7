//! Pause gate for an external file watcher
//!
//! The store pauses the watcher before it touches the filesystem and resumes
//! it afterwards, so change notifications for the store's own writes never
//! reach the importer. Pauses are counted: only the first pause reaches the
//! watcher, and only the release that brings the count back to zero resumes
//! it. The pause is held by an RAII value, so an early return or a panic
//! still resumes the watcher.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// An external file watcher that can be paused and resumed.
pub trait FileWatcher: Send + Sync {
    fn pause(&self);
    fn resume(&self);
}

/// Counting pause gate shared by every store that writes under a watched root.
pub struct WatcherGuard {
    watcher: Option<Arc<dyn FileWatcher>>,
    depth: Mutex<usize>,
}

impl WatcherGuard {
    pub fn new(watcher: Arc<dyn FileWatcher>) -> Self {
        Self {
            watcher: Some(watcher),
            depth: Mutex::new(0),
        }
    }

    /// A guard with no watcher behind it. Pauses are still counted.
    pub fn detached() -> Self {
        Self {
            watcher: None,
            depth: Mutex::new(0),
        }
    }

    /// Pause the watcher until the returned value is dropped.
    pub fn pause(&self) -> PausedWatcher<'_> {
        let mut depth = self.depth.lock().unwrap_or_else(PoisonError::into_inner);
        if *depth == 0 {
            tracing::trace!("Pausing file watcher");
            if let Some(watcher) = &self.watcher {
                watcher.pause();
            }
        }
        *depth += 1;
        PausedWatcher { guard: self }
    }

    /// Number of pauses currently held.
    pub fn depth(&self) -> usize {
        *self.depth.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_paused(&self) -> bool {
        self.depth() > 0
    }

    fn release(&self) {
        let mut depth = self.depth.lock().unwrap_or_else(PoisonError::into_inner);
        *depth = depth.saturating_sub(1);
        if *depth == 0 {
            tracing::trace!("Resuming file watcher");
            if let Some(watcher) = &self.watcher {
                watcher.resume();
            }
        }
    }
}

impl Default for WatcherGuard {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for WatcherGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherGuard")
            .field("attached", &self.watcher.is_some())
            .field("depth", &self.depth())
            .finish()
    }
}

/// A held pause. Dropping it releases the pause.
#[must_use = "the watcher resumes as soon as this value is dropped"]
pub struct PausedWatcher<'a> {
    guard: &'a WatcherGuard,
}

impl Drop for PausedWatcher<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingWatcher {
        pauses: AtomicUsize,
        resumes: AtomicUsize,
    }

    impl FileWatcher for CountingWatcher {
        fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }

        fn resume(&self) {
            self.resumes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn pause_and_resume_once_per_scope() {
        let watcher = Arc::new(CountingWatcher::default());
        let guard = WatcherGuard::new(watcher.clone());

        {
            let _paused = guard.pause();
            assert!(guard.is_paused());
            assert_eq!(watcher.pauses.load(Ordering::SeqCst), 1);
            assert_eq!(watcher.resumes.load(Ordering::SeqCst), 0);
        }

        assert!(!guard.is_paused());
        assert_eq!(watcher.resumes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn inner_release_does_not_resume_outer_pause() {
        let watcher = Arc::new(CountingWatcher::default());
        let guard = WatcherGuard::new(watcher.clone());

        let outer = guard.pause();
        {
            let _inner = guard.pause();
            assert_eq!(guard.depth(), 2);
        }
        assert_eq!(watcher.resumes.load(Ordering::SeqCst), 0);
        assert!(guard.is_paused());

        drop(outer);
        assert_eq!(watcher.pauses.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.resumes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resumes_when_the_paused_scope_panics() {
        let watcher = Arc::new(CountingWatcher::default());
        let guard = WatcherGuard::new(watcher.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _paused = guard.pause();
            panic!("write failed");
        }));

        assert!(result.is_err());
        assert!(!guard.is_paused());
        assert_eq!(watcher.resumes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detached_guard_still_counts() {
        let guard = WatcherGuard::detached();
        let paused = guard.pause();
        assert_eq!(guard.depth(), 1);
        drop(paused);
        assert_eq!(guard.depth(), 0);
    }
}
