use tokio::time::Instant;

/// Monotonic time source for countdown deadlines.
///
/// Uses tokio's `Instant` so a paused test runtime drives it together with
/// the ticker's sleeps.
pub trait SessionClock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SessionClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn follows_paused_runtime_time() {
        let clock = SystemClock;
        let before = clock.now();
        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_eq!(clock.now() - before, Duration::from_millis(1_500));
    }
}
