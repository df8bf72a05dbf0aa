//! Randomized pauses between browser steps.

use leadscout_core::DelayRange;
use rand::Rng;
use std::time::Duration;

/// Pick a uniformly random duration inside `range` (inclusive).
pub fn pick_delay(range: DelayRange) -> Duration {
    if range.max_ms <= range.min_ms {
        return range.min();
    }
    let ms = rand::thread_rng().gen_range(range.min_ms..=range.max_ms);
    Duration::from_millis(ms)
}

/// Sleep for a random duration inside `range`.
pub async fn random_delay(range: DelayRange) {
    let delay = pick_delay(range);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
