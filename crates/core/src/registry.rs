//! Tracks which sources are being scanned.
//!
//! A [`ScanRegistry`] admits one scan per source at a time, optionally only
//! one scan overall. Starting a scan returns a [`ScanGuard`]; dropping the
//! guard ends the scan.
//!
//! ```rust
//! use threatscope_core::ScanRegistry;
//!
//! let registry = ScanRegistry::new();
//! let guard = registry.try_begin("https://example.com/feed").unwrap();
//! assert!(registry.try_begin("https://example.com/feed").is_err());
//!
//! registry.cancel("https://example.com/feed");
//! assert!(guard.is_cancelled());
//!
//! drop(guard);
//! assert!(registry.try_begin("https://example.com/feed").is_ok());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Result, ThreatscopeError};

type ActiveScans = Arc<Mutex<HashMap<String, Arc<AtomicBool>>>>;

fn lock(active: &ActiveScans) -> MutexGuard<'_, HashMap<String, Arc<AtomicBool>>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct ScanRegistry {
    active: ActiveScans,
    single_scan: bool,
}

impl ScanRegistry {
    /// One scan per source, any number of sources at once.
    pub fn new() -> Self {
        Self::default()
    }

    /// At most one scan in flight across all sources.
    pub fn single_scan() -> Self {
        Self { active: ActiveScans::default(), single_scan: true }
    }

    /// Starts a scan of `source`.
    ///
    /// Fails with [`ThreatscopeError::ScanInProgress`] when that source is
    /// already being scanned, or when any scan is running on a single-scan
    /// registry.
    pub fn try_begin(&self, source: &str) -> Result<ScanGuard> {
        let mut active = lock(&self.active);

        if active.contains_key(source) {
            return Err(ThreatscopeError::ScanInProgress(source.to_string()));
        }
        if self.single_scan
            && let Some(running) = active.keys().next()
        {
            return Err(ThreatscopeError::ScanInProgress(running.clone()));
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        active.insert(source.to_string(), Arc::clone(&cancelled));
        tracing::debug!(source, "scan started");

        Ok(ScanGuard { source: source.to_string(), cancelled, active: Arc::clone(&self.active) })
    }

    /// Flags the scan of `source` as cancelled. Returns false if none is running.
    pub fn cancel(&self, source: &str) -> bool {
        match lock(&self.active).get(source) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                tracing::debug!(source, "scan cancellation requested");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, source: &str) -> bool {
        lock(&self.active).contains_key(source)
    }

    /// Sources with a scan in flight, sorted.
    pub fn active_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = lock(&self.active).keys().cloned().collect();
        sources.sort();
        sources
    }
}

/// A running scan. Ends the scan when dropped.
#[derive(Debug)]
pub struct ScanGuard {
    source: String,
    cancelled: Arc<AtomicBool>,
    active: ActiveScans,
}

impl ScanGuard {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether [`ScanRegistry::cancel`] was called for this scan.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.source);
        tracing::debug!(source = %self.source, "scan finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_scan_per_source() {
        let registry = ScanRegistry::new();
        let _a = registry.try_begin("a").unwrap();
        let _b = registry.try_begin("b").unwrap();

        assert!(matches!(registry.try_begin("a"), Err(ThreatscopeError::ScanInProgress(s)) if s == "a"));
        assert_eq!(registry.active_sources(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_single_scan_registry() {
        let registry = ScanRegistry::single_scan();
        let guard = registry.try_begin("a").unwrap();

        assert!(matches!(registry.try_begin("b"), Err(ThreatscopeError::ScanInProgress(s)) if s == "a"));
        drop(guard);
        assert!(registry.try_begin("b").is_ok());
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let registry = ScanRegistry::new();
        {
            let guard = registry.try_begin("feed").unwrap();
            assert_eq!(guard.source(), "feed");
            assert!(registry.is_active("feed"));
        }
        assert!(!registry.is_active("feed"));
    }

    #[test]
    fn test_cancel() {
        let registry = ScanRegistry::new();
        assert!(!registry.cancel("missing"));

        let guard = registry.try_begin("feed").unwrap();
        assert!(!guard.is_cancelled());
        assert!(registry.cancel("feed"));
        assert!(guard.is_cancelled());
    }

    #[test]
    fn test_registry_across_threads() {
        let registry = Arc::new(ScanRegistry::new());
        let guard = registry.try_begin("shared").unwrap();

        let other = Arc::clone(&registry);
        let rejected = std::thread::spawn(move || other.try_begin("shared").is_err())
            .join()
            .unwrap();

        assert!(rejected);
        drop(guard);
    }
}
