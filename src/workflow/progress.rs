use std::future::Future;
use std::time::Duration;

pub const DEFAULT_STEP: u8 = 8;
pub const DEFAULT_TICK: Duration = Duration::from_millis(600);
const CAP: u8 = 90;

/// Cosmetic progress for a long backend call. It never reaches 100 on its
/// own; only `finish` does, and callers decide completion from the call itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedProgress {
    percent: u8,
    step: u8,
}

impl SimulatedProgress {
    pub fn new(step: u8) -> Self {
        Self { percent: 0, step }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn tick(&mut self) -> u8 {
        if self.percent < CAP {
            self.percent = self.percent.saturating_add(self.step).min(CAP);
        }
        self.percent
    }

    pub fn finish(&mut self) -> u8 {
        self.percent = 100;
        self.percent
    }
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

/// Awaits `work`, logging simulated progress every `tick` until it resolves.
pub async fn track<F>(label: &str, tick: Duration, work: F) -> F::Output
where
    F: Future,
{
    let mut progress = SimulatedProgress::default();
    let mut interval = tokio::time::interval(tick);
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;

    tokio::pin!(work);
    loop {
        tokio::select! {
            output = &mut work => {
                tracing::info!(task = label, percent = progress.finish(), "done");
                return output;
            }
            _ = interval.tick() => {
                tracing::info!(task = label, percent = progress.tick(), "working (simulated progress)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_at_ninety_until_finished() {
        let mut progress = SimulatedProgress::default();
        for _ in 0..50 {
            progress.tick();
        }
        assert_eq!(progress.percent(), 90);
        assert_eq!(progress.finish(), 100);
    }

    #[test]
    fn advances_by_fixed_step() {
        let mut progress = SimulatedProgress::new(10);
        assert_eq!(progress.tick(), 10);
        assert_eq!(progress.tick(), 20);
    }

    #[tokio::test]
    async fn track_returns_the_work_output() {
        let value = track("test", Duration::from_millis(1), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            42
        })
        .await;
        assert_eq!(value, 42);
    }
}
