//! Per-embed processing guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// Busy flag owned by one embed element.
///
/// Checked and set atomically before a render starts; a second trigger
/// while the first is still running is refused.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a render currently holds the flag
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the flag, or `None` when it is already held
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { flag: self })
    }
}

/// Holds a [`BusyFlag`]; releases it when dropped, on success or error
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_second_acquire_is_refused() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire();
        assert!(guard.is_some());
        assert!(flag.is_busy());
        assert!(flag.try_acquire().is_none());
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_early_return() {
        fn fails(flag: &BusyFlag) -> Result<(), &'static str> {
            let _guard = flag.try_acquire().ok_or("busy")?;
            Err("render failed")
        }
        let flag = BusyFlag::new();
        assert_eq!(fails(&flag), Err("render failed"));
        assert!(!flag.is_busy());
    }

    #[test]
    fn test_concurrent_triggers_single_winner() {
        let flag = Arc::new(BusyFlag::new());
        let barrier = Arc::new(Barrier::new(8));
        let winners: Vec<bool> = (0..8)
            .map(|_| {
                let flag = Arc::clone(&flag);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let guard = flag.try_acquire();
                    let won = guard.is_some();
                    // keep holding until everyone has tried
                    barrier.wait();
                    won
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();
        assert_eq!(winners.iter().filter(|w| **w).count(), 1);
    }
}
