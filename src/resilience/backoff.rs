//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Delay before retry number `attempt` (1-based), capped by the policy.
pub fn calculate_backoff(attempt: u32, policy: &RetryConfig) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = policy
        .base_delay_ms
        .saturating_mul(exponential_base)
        .min(policy.max_delay_ms);

    // Jitter: up to 10% on top of the delay
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_exponentially_up_to_cap() {
        let policy = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        };

        assert_eq!(calculate_backoff(0, &policy), Duration::ZERO);

        let first = calculate_backoff(1, &policy).as_millis();
        assert!((100..110).contains(&first), "{}", first);

        let second = calculate_backoff(2, &policy).as_millis();
        assert!((200..220).contains(&second), "{}", second);

        let capped = calculate_backoff(10, &policy).as_millis();
        assert!((1000..1100).contains(&capped), "{}", capped);
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let policy = RetryConfig::default();
        let delay = calculate_backoff(u32::MAX, &policy);
        assert!(delay >= Duration::from_millis(policy.max_delay_ms));
    }
}
