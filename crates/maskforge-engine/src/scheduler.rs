//! Cooperative throttling primitives
//!
//! Two small pieces keep pixel-heavy work off each other's toes without
//! preemptive cancellation:
//!
//! - [`BusyFlag`]: at most one mask-producing operation in flight; further
//!   requests are rejected, not queued.
//! - [`RenderScheduler`]: preview renders coalesce. A request made while
//!   a render runs marks it stale, and exactly one follow-up render
//!   executes afterwards no matter how many requests piled up.

use std::sync::atomic::{AtomicBool, Ordering};

/// Serializes mask-producing operations. Acquisition is try-only; a busy
/// engine rejects new selection work instead of queueing it.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the flag. Returns `None` when an operation is already
    /// in flight. The flag releases when the guard drops.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(BusyGuard { flag: &self.busy })
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the owning [`BusyFlag`] on drop.
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Coalescing render loop.
///
/// `request` either runs renders on the calling thread (when idle) or
/// marks the active loop stale and returns immediately. The active loop
/// keeps rendering while requests arrive, so any burst collapses into the
/// in-flight render plus exactly one follow-up.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: AtomicBool,
    running: AtomicBool,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a render. The closure runs zero or more times on this
    /// thread: zero when another thread's loop picks the request up, one
    /// or more when this call becomes the active loop.
    pub fn request(&self, mut render: impl FnMut()) {
        self.pending.store(true, Ordering::SeqCst);
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        loop {
            while self.pending.swap(false, Ordering::SeqCst) {
                render();
            }
            self.running.store(false, Ordering::SeqCst);
            // A request can slip in between the final pending check and
            // releasing the running flag; pick it up instead of losing it.
            if self.pending.load(Ordering::SeqCst) && !self.running.swap(true, Ordering::SeqCst) {
                continue;
            }
            break;
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_busy_flag_rejects_second_acquire() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire().expect("first acquire succeeds");
        assert!(flag.try_acquire().is_none());
        assert!(flag.is_busy());
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn test_scheduler_runs_once_when_idle() {
        let scheduler = RenderScheduler::new();
        let count = AtomicUsize::new(0);
        scheduler.request(|| {
            count.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_burst_collapses_to_one_follow_up() {
        let scheduler = RenderScheduler::new();
        let count = AtomicUsize::new(0);
        scheduler.request(|| {
            let n = count.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                // Three more requests arrive while the first render runs;
                // the loop is already active, so each returns immediately.
                scheduler.request(|| unreachable!("nested loop must not start"));
                scheduler.request(|| unreachable!("nested loop must not start"));
                scheduler.request(|| unreachable!("nested loop must not start"));
            }
        });
        assert_eq!(count.load(Ordering::SeqCst), 2, "burst must collapse to one follow-up");
    }
}
