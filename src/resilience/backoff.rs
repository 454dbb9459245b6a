//! Exponential backoff with jitter for re-list retries.

use std::time::Duration;
use rand::Rng;

/// Delay before retry `attempt` (1-based): `base * 2^(attempt-1)`, capped at `max`,
/// plus up to 10% jitter so replicas do not hammer the API server in lockstep.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponent = (attempt - 1).min(32);
    let capped_ms = base_ms.saturating_mul(1u64 << exponent).min(max_ms);

    let jitter_range = capped_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_ms + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_then_caps() {
        assert_eq!(calculate_backoff(0, 500, 30_000), Duration::ZERO);

        let first = calculate_backoff(1, 500, 30_000);
        assert!(first >= Duration::from_millis(500) && first < Duration::from_millis(550));

        let third = calculate_backoff(3, 500, 30_000);
        assert!(third >= Duration::from_millis(2_000) && third < Duration::from_millis(2_200));

        let capped = calculate_backoff(20, 500, 30_000);
        assert!(capped >= Duration::from_millis(30_000) && capped < Duration::from_millis(33_000));
    }

    #[test]
    fn test_backoff_large_attempt_does_not_overflow() {
        let delay = calculate_backoff(u32::MAX, 1_000, 60_000);
        assert!(delay >= Duration::from_millis(60_000));
    }
}
