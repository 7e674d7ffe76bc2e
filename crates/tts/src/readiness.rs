use std::time::Duration;

use tokio::time::Instant;

use crate::provider::TtsBackend;

/// Outcome of waiting for the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A probe answered 2xx
    Ready { attempts: u32, waited: Duration },
    /// The wait budget ran out first
    TimedOut { attempts: u32, waited: Duration },
}

/// Bounded polling loop over [`TtsBackend::check_ready`]
///
/// Holds no state between calls, so every job probes afresh.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessProber {
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl ReadinessProber {
    pub const fn new(ready_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            ready_timeout,
            poll_interval,
        }
    }

    /// Probe until the backend is ready or `ready_timeout` elapses
    ///
    /// The first probe is sent immediately. A probe still in flight at the
    /// deadline is abandoned.
    pub async fn wait_until_ready<B: TtsBackend + ?Sized>(&self, backend: &B) -> Readiness {
        let start = Instant::now();
        let deadline = start + self.ready_timeout;
        let mut attempts = 0;

        loop {
            attempts += 1;

            match tokio::time::timeout_at(deadline, backend.check_ready()).await {
                Ok(Ok(())) => {
                    let waited = start.elapsed();
                    tracing::debug!(attempts, ?waited, "backend ready");
                    return Readiness::Ready { attempts, waited };
                }
                Ok(Err(reason)) => {
                    tracing::debug!(attempts, %reason, "backend not ready yet");
                }
                Err(_) => break,
            }

            let next_probe = Instant::now() + self.poll_interval;

            if next_probe >= deadline {
                tokio::time::sleep_until(deadline).await;
                break;
            }

            tokio::time::sleep_until(next_probe).await;
        }

        let waited = start.elapsed();
        tracing::warn!(attempts, ?waited, "backend did not become ready");

        Readiness::TimedOut { attempts, waited }
    }
}
