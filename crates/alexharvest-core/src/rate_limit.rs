//! Reactive request throttling.
//!
//! Tracks requests issued since construction and compares the achieved rate
//! against a ceiling before each new request. When over the ceiling it sleeps
//! for one request's worth of time (`1 / max_rps`). It only reacts to the past
//! rate, so short bursts above the ceiling are possible.

use std::time::{Duration, Instant};

use crate::clock::Clock;

#[derive(Debug)]
pub struct RateLimiter<C> {
    clock: C,
    max_rps: Option<f64>,
    requests: u64,
    start: Instant,
}

impl<C: Clock> RateLimiter<C> {
    /// Limiter with a requests-per-second ceiling; a non-positive ceiling disables throttling.
    pub fn new(clock: C, max_rps: f64) -> Self {
        let start = clock.now();
        Self {
            clock,
            max_rps: (max_rps > 0.0).then_some(max_rps),
            requests: 0,
            start,
        }
    }

    /// Limiter that counts requests but never sleeps
    pub fn unlimited(clock: C) -> Self {
        Self::new(clock, 0.0)
    }

    /// Requests per second achieved since start
    pub fn achieved_rate(&self) -> f64 {
        let elapsed = (self.clock.now() - self.start).as_secs_f64();
        if elapsed > 0.0 {
            self.requests as f64 / elapsed
        } else if self.requests > 0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Call right before issuing a request.
    pub fn acquire(&mut self) {
        if let Some(max) = self.max_rps {
            if self.requests > 0 && self.achieved_rate() > max {
                let pause = Duration::from_secs_f64(1.0 / max);
                log::trace!(
                    "throttling: {:.1} req/s over {max} req/s, sleeping {pause:?}",
                    self.achieved_rate()
                );
                self.clock.sleep(pause);
            }
        }
        self.requests += 1;
    }

    /// Requests issued so far
    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
