//! Cooperative stop signals polled between generations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Polled by the optimizer once per generation
pub trait StopSignal {
    fn should_stop(&self) -> bool;
}

/// Never requests a stop
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn should_stop(&self) -> bool {
        false
    }
}

impl StopSignal for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: StopSignal + ?Sized> StopSignal for &T {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

impl<T: StopSignal + ?Sized> StopSignal for Arc<T> {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

/// Requests a stop once a wall-clock deadline has passed
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }
}

impl StopSignal for Deadline {
    fn should_stop(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        assert!(!flag.should_stop());
        flag.store(true, Ordering::Relaxed);
        assert!(flag.should_stop());
    }

    #[test]
    fn test_deadline() {
        assert!(Deadline::after(Duration::ZERO).should_stop());
        assert!(!Deadline::after(Duration::from_secs(3600)).should_stop());
        assert!(!NeverStop.should_stop());
    }
}
