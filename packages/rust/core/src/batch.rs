//! Batch planning and pacing between batch starts.

use std::time::Duration;

use tokio::time::Instant;

use storyfeed_shared::StoryId;

/// Split `ids` into ordered batches of `batch_size`.
///
/// With `max_batches > 0` the last batch takes the whole remainder, so it can
/// be larger than `batch_size`. Empty batches are never produced.
pub fn plan_batches(ids: &[StoryId], batch_size: usize, max_batches: usize) -> Vec<Vec<StoryId>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::new();
    let mut rest = ids;

    while !rest.is_empty() {
        if max_batches != 0 && batches.len() + 1 == max_batches {
            batches.push(rest.to_vec());
            break;
        }
        let (head, tail) = rest.split_at(batch_size.min(rest.len()));
        batches.push(head.to_vec());
        rest = tail;
    }

    batches
}

/// Enforces a minimum interval between consecutive batch starts.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_start: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: None,
        }
    }

    /// Wait until `interval` has passed since the previous call, then mark
    /// the new start. The first call returns immediately.
    pub async fn wait_turn(&mut self) {
        if let Some(previous) = self.last_start {
            let ready_at = previous + self.interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::info!(
                    wait_ms = (ready_at - now).as_millis(),
                    "pacing before next batch"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        self.last_start = Some(Instant::now());
    }
}
