//! Bounded readiness polling.
//!
//! Replaces fixed-duration sleeps with probe loops: exponential backoff
//! under an overall time budget, and a distinct timeout error naming the
//! probe that never became ready.

use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{LempError, LempResult};

/// Backoff schedule for one readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the second attempt.
    pub initial: Duration,
    /// Upper bound on the per-attempt delay.
    pub cap: Duration,
    /// Total time budget across all attempts.
    pub budget: Duration,
}

impl RetryPolicy {
    /// Standard schedule: 500 ms initial delay, doubling, capped at 5 s.
    pub fn with_budget(budget: Duration) -> Self {
        RetryPolicy {
            initial: Duration::from_millis(500),
            cap: Duration::from_secs(5),
            budget,
        }
    }
}

/// Poll `probe` until it returns true or the budget is exhausted.
/// Returns the number of attempts made.
pub fn wait_until(
    what: &str,
    policy: &RetryPolicy,
    mut probe: impl FnMut() -> bool,
) -> LempResult<u32> {
    let start = Instant::now();
    let mut delay = policy.initial;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if probe() {
            return Ok(attempts);
        }
        if start.elapsed() + delay > policy.budget {
            return Err(LempError::ReadinessTimeout {
                what: what.to_string(),
                waited_secs: start.elapsed().as_secs(),
                attempts,
            });
        }
        thread::sleep(delay);
        delay = (delay * 2).min(policy.cap);
    }
}

/// One TCP connect attempt, used to probe the published proxy port.
pub fn probe_tcp(addr: SocketAddr, timeout: Duration) -> bool {
    TcpStream::connect_timeout(&addr, timeout).is_ok()
}
