use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Time source and delay primitive used for every timestamp and wait in the
/// orchestrator and scheduler.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock reading anchored to a tokio `Instant`.
///
/// `now()` is `anchor + elapsed` on tokio's clock, so under a paused test
/// runtime both `now()` and `sleep()` advance together with virtual time.
#[derive(Debug, Clone)]
pub struct TokioClock {
    wall_anchor: DateTime<Utc>,
    instant_anchor: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(wall_anchor: DateTime<Utc>) -> Self {
        Self {
            wall_anchor,
            instant_anchor: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.instant_anchor.elapsed();
        match chrono::Duration::from_std(elapsed) {
            Ok(delta) => self.wall_anchor + delta,
            Err(_) => self.wall_anchor,
        }
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test(start_paused = true)]
    async fn now_follows_virtual_time() {
        let base = Utc.with_ymd_and_hms(2026, 3, 2, 6, 40, 0).unwrap();
        let clock = TokioClock::starting_at(base);
        assert_eq!(clock.now(), base);

        clock.sleep(Duration::from_secs(90)).await;
        assert_eq!(clock.now(), base + chrono::Duration::seconds(90));
    }
}
