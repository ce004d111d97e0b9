//! Time source for sleeps and elapsed-time checks.
//!
//! Pipelines never call `std::thread::sleep` directly; they go through a
//! [`Clock`] so retry and throttling behaviour can be driven by a fake in tests.

use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-util"))]
mod manual {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use super::Clock;

    #[derive(Debug, Default)]
    struct State {
        offset: Duration,
        sleeps: Vec<Duration>,
    }

    /// Clock that only moves when slept on or advanced; records every sleep.
    ///
    /// Clones share state, so a test can keep one handle and move another
    /// into the pipeline under test.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        base: Instant,
        state: Arc<Mutex<State>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                base: Instant::now(),
                state: Arc::default(),
            }
        }

        /// Move time forward without recording a sleep
        pub fn advance(&self, d: Duration) {
            self.state.lock().unwrap().offset += d;
        }

        /// Every sleep requested so far, in order
        pub fn sleeps(&self) -> Vec<Duration> {
            self.state.lock().unwrap().sleeps.clone()
        }

        pub fn elapsed(&self) -> Duration {
            self.state.lock().unwrap().offset
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + self.state.lock().unwrap().offset
        }

        fn sleep(&self, d: Duration) {
            let mut state = self.state.lock().unwrap();
            state.offset += d;
            state.sleeps.push(d);
        }
    }
}
