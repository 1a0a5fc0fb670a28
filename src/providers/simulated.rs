//! Simulated provider generating plausible readings on a timer

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::trace;

use crate::events::SourceEvent;
use crate::provider::Provider;
use crate::types::Reading;
use crate::Result;

/// Systolic values drawn by the simulator.
pub const SIM_SYSTOLIC: (u16, u16) = (100, 160);
/// Diastolic values drawn by the simulator, before the ordering fix-up.
pub const SIM_DIASTOLIC: (u16, u16) = (60, 100);
/// Pulse values drawn by the simulator.
pub const SIM_PULSE: (u16, u16) = (55, 95);

/// Shortest allowed interval between simulated readings.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Provider that emits one synthetic reading per interval
///
/// The first reading is produced immediately, then one per period. The timer
/// is created on the first [`next_events`](Provider::next_events) call, so
/// construction works outside a Tokio runtime.
pub struct SimulatedProvider<R: Rng + Send + 'static = StdRng> {
    rng: R,
    interval: Option<Interval>,
    period: Duration,
}

impl SimulatedProvider<StdRng> {
    /// Create a simulator seeded from the OS
    pub fn new(period: Duration) -> Self {
        Self::with_rng(period, StdRng::from_os_rng())
    }

    /// Create a deterministic simulator
    pub fn seeded(period: Duration, seed: u64) -> Self {
        Self::with_rng(period, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send + 'static> SimulatedProvider<R> {
    /// Create a simulator with a caller-supplied RNG; `period` is raised to [`MIN_INTERVAL`]
    pub fn with_rng(period: Duration, rng: R) -> Self {
        Self { rng, interval: None, period: period.max(MIN_INTERVAL) }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Draw one reading and its wire-like raw bytes.
    pub fn sample(&mut self) -> Result<(Reading, Vec<u8>)> {
        let systolic = self.rng.random_range(SIM_SYSTOLIC.0..=SIM_SYSTOLIC.1);
        let mut diastolic = self.rng.random_range(SIM_DIASTOLIC.0..=SIM_DIASTOLIC.1);
        let pulse = self.rng.random_range(SIM_PULSE.0..=SIM_PULSE.1);

        if diastolic >= systolic {
            diastolic = systolic - 20;
        }

        let text = format!("{systolic},{diastolic},{pulse}");
        let raw = format!("{text}\r\n").into_bytes();
        let reading = Reading::new(systolic, diastolic, pulse, Local::now().naive_local(), text)?;
        Ok((reading, raw))
    }
}

#[async_trait::async_trait]
impl<R: Rng + Send + 'static> Provider for SimulatedProvider<R> {
    async fn next_events(&mut self) -> Result<Option<Vec<SourceEvent>>> {
        let period = self.period;
        let ticker = self.interval.get_or_insert_with(|| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;

        let (reading, raw) = self.sample()?;
        trace!(%reading, "Simulated reading");
        Ok(Some(vec![SourceEvent::RawBytes(raw), SourceEvent::Reading(reading)]))
    }

    fn label(&self) -> &str {
        "simulator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tokio::time::Instant;

    proptest! {
        #[test]
        fn prop_samples_are_plausible(seed in any::<u64>()) {
            let mut provider = SimulatedProvider::seeded(Duration::from_secs(1), seed);

            for _ in 0..20 {
                let (reading, raw) = provider.sample().unwrap();
                prop_assert!(reading.diastolic() < reading.systolic());
                prop_assert!((55..=95).contains(&reading.pulse()));
                prop_assert!((100..=160).contains(&reading.systolic()));
                prop_assert_eq!(
                    raw,
                    format!(
                        "{},{},{}\r\n",
                        reading.systolic(),
                        reading.diastolic(),
                        reading.pulse()
                    )
                    .into_bytes()
                );
            }
        }
    }

    #[test]
    fn constructs_outside_a_runtime() {
        let provider = SimulatedProvider::new(Duration::from_secs(3));
        assert_eq!(provider.period(), Duration::from_secs(3));
    }

    #[test]
    fn short_periods_are_clamped() {
        let provider = SimulatedProvider::seeded(Duration::from_millis(10), 1);
        assert_eq!(provider.period(), MIN_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_the_configured_period() {
        let mut provider = SimulatedProvider::seeded(Duration::from_secs(2), 7);
        let started = Instant::now();

        let first = provider.next_events().await.unwrap().unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(matches!(first[0], SourceEvent::RawBytes(_)));
        assert!(matches!(first[1], SourceEvent::Reading(_)));

        provider.next_events().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(2));
        provider.next_events().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }
}
