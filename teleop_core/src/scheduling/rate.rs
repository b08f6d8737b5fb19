use crate::error::{TeleopError, TeleopResult};
use std::time::{Duration, Instant};

/// Fixed-rate sleeper for node loops
///
/// `sleep` waits until one period after the previous deadline, so work done
/// between calls is absorbed into the period. If the loop falls more than a
/// full period behind, the schedule restarts from now instead of bursting.
#[derive(Debug, Clone)]
pub struct Rate {
    period: Duration,
    last: Instant,
}

impl Rate {
    pub fn new(hz: f64) -> TeleopResult<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(TeleopError::invalid_input(format!(
                "Rate must be a positive number of Hz, got {}",
                hz
            )));
        }
        let period = Duration::try_from_secs_f64(1.0 / hz).map_err(|e| {
            TeleopError::invalid_input(format!("Rate of {} Hz gives an unusable period: {}", hz, e))
        })?;
        let last = Instant::now();
        // deadlines are computed as last + period
        if last.checked_add(period).is_none() {
            return Err(TeleopError::invalid_input(format!(
                "Rate of {} Hz gives a period too long to schedule",
                hz
            )));
        }
        Ok(Self { period, last })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the next deadline (zero if already late)
    pub fn remaining(&self) -> Duration {
        (self.last + self.period).saturating_duration_since(Instant::now())
    }

    /// Restart the schedule from now
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Block for the remainder of the current period
    pub fn sleep(&mut self) {
        let deadline = self.last + self.period;
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        self.last = deadline;

        if now.saturating_duration_since(self.last) > self.period {
            self.last = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_rates() {
        assert!(Rate::new(0.0).is_err());
        assert!(Rate::new(-5.0).is_err());
        assert!(Rate::new(f64::NAN).is_err());
        assert!(Rate::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_rates_too_slow_for_a_duration() {
        let err = Rate::new(1e-30).unwrap_err();
        assert!(matches!(err, TeleopError::InvalidInput(_)));
        assert!(Rate::new(f64::MIN_POSITIVE).is_err());
        // slow but representable
        assert_eq!(Rate::new(0.5).unwrap().period(), Duration::from_secs(2));
    }

    #[test]
    fn test_period_from_hz() {
        let rate = Rate::new(10.0).unwrap();
        assert_eq!(rate.period(), Duration::from_millis(100));
    }

    #[test]
    fn test_sleep_holds_rate() {
        let mut rate = Rate::new(100.0).unwrap();
        let start = Instant::now();
        for _ in 0..5 {
            rate.sleep();
        }
        // five 10ms periods
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_sleep_absorbs_work_time() {
        let mut rate = Rate::new(20.0).unwrap();
        std::thread::sleep(Duration::from_millis(30));
        let start = Instant::now();
        rate.sleep();
        // 50ms period minus the 30ms already spent
        assert!(start.elapsed() < Duration::from_millis(45));
    }

    #[test]
    fn test_falling_behind_resets_schedule() {
        let mut rate = Rate::new(100.0).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        rate.sleep();
        // after the reset a full period is ahead again
        assert!(rate.remaining() > Duration::from_millis(5));
    }
}
