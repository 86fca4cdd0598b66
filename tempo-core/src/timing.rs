//! Launch timing utilities
//!
//! Dispatch strategies schedule launches against absolute [`Instant`]s. Waiting for
//! those instants combines an OS sleep for the bulk of the gap with a short
//! busy-wait at the end: `std::thread::sleep` alone routinely overshoots by tens of
//! microseconds, which is a sizeable fraction of a gap at thousands of launches
//! per second.

use std::time::{Duration, Instant};

/// Final stretch of a wait that is spent spinning instead of sleeping
pub const SPIN_THRESHOLD: Duration = Duration::from_micros(200);

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Fixed gap between launches at `rate` actions per second
///
/// Truncated to whole nanoseconds. A non-positive or NaN rate saturates to the
/// largest representable gap instead of panicking.
pub fn interval_for_rate(rate: f64) -> Duration {
    let nanos = if rate > 0.0 { NANOS_PER_SEC / rate } else { f64::INFINITY };
    Duration::from_nanos(nanos as u64)
}

/// Block the calling thread until `deadline`
///
/// Returns immediately when the deadline has already passed. Never returns
/// before the deadline.
///
/// # Example
/// ```
/// use std::time::{Duration, Instant};
/// use tempo_core::timing::sleep_until;
///
/// let deadline = Instant::now() + Duration::from_millis(2);
/// sleep_until(deadline);
/// assert!(Instant::now() >= deadline);
/// ```
pub fn sleep_until(deadline: Instant) {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return;
    }

    if remaining > SPIN_THRESHOLD {
        std::thread::sleep(remaining - SPIN_THRESHOLD);
    }

    busy_wait_until(deadline);
}

/// Busy-wait until the target instant is reached
///
/// Deterministic to within a few hundred nanoseconds at the cost of a fully
/// occupied core, so only use it for short waits.
#[inline]
pub fn busy_wait_until(deadline: Instant) {
    while Instant::now() < deadline {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_until_past_deadline_returns_immediately() {
        let deadline =
            Instant::now().checked_sub(Duration::from_millis(50)).unwrap_or_else(Instant::now);
        let start = Instant::now();
        sleep_until(deadline);
        assert!(start.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn test_sleep_until_never_early() {
        for micros in [50, 500, 5_000] {
            let deadline = Instant::now() + Duration::from_micros(micros);
            sleep_until(deadline);
            assert!(Instant::now() >= deadline, "woke before {}us deadline", micros);
        }
    }

    #[test]
    #[cfg(not(tarpaulin))]
    fn test_sleep_until_precision() {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(3);
        sleep_until(deadline);
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(3));
        assert!(elapsed < Duration::from_millis(8), "overshot: {:?}", elapsed);
    }

    #[test]
    fn test_interval_for_rate() {
        assert_eq!(interval_for_rate(1000.0), Duration::from_millis(1));
        assert_eq!(interval_for_rate(0.5), Duration::from_secs(2));
        assert_eq!(interval_for_rate(0.0), Duration::from_nanos(u64::MAX));
        assert_eq!(interval_for_rate(f64::NAN), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn test_busy_wait_until() {
        let start = Instant::now();
        let target = start + Duration::from_micros(50);
        busy_wait_until(target);
        assert!(start.elapsed() >= Duration::from_micros(50));
    }
}
