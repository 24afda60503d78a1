use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Global admission gate: at most one request per interval, no burst capacity.
///
/// One instance is shared by every request. The lock is only held for the
/// compare-and-update and never across I/O.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_admitted: Mutex<Option<Instant>>,
}

/// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Whole seconds the caller should wait, rounded up
    Rejected { retry_after_secs: u64 },
}

impl RateLimiter {
    /// `requests_per_second` of zero is treated as one.
    pub fn new(requests_per_second: u32) -> Self {
        let interval = Duration::from_secs(1) / requests_per_second.max(1);
        Self {
            interval,
            last_admitted: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn check(&self) -> Admission {
        self.check_at(Instant::now())
    }

    /// Admission check against an explicit clock reading
    pub fn check_at(&self, now: Instant) -> Admission {
        let mut last_admitted = self
            .last_admitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = *last_admitted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.interval {
                let remaining = self.interval - elapsed;
                return Admission::Rejected {
                    retry_after_secs: remaining.as_secs() + 1,
                };
            }
        }

        // Never move backwards if a stale reading races in.
        let admitted_at = match *last_admitted {
            Some(last) if last > now => last,
            _ => now,
        };
        *last_admitted = Some(admitted_at);
        Admission::Admitted
    }
}
