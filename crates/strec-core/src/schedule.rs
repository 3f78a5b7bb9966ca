//! Schedule gate: block the run until a wall-clock start time.
//!
//! A requested time that is not strictly in the future means the same time
//! on the next calendar day, so the computed target is always ahead of now
//! and at most a day away.

use chrono::{DateTime, Duration, Local, Timelike};
use thiserror::Error;

use crate::cancel::ShutdownToken;

/// When to start the capture jobs: right away, or at a local wall-clock
/// time (today, or tomorrow if already past).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSpec {
    Immediate,
    At { hour: u32, minute: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("hour must be 00-23 and minute 00-59, got {hour:02}:{minute:02}")]
    OutOfRange { hour: u32, minute: u32 },
}

impl ScheduleSpec {
    /// Validated `At` constructor.
    pub fn at(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::OutOfRange { hour, minute });
        }
        Ok(ScheduleSpec::At { hour, minute })
    }
}

/// Next occurrence of `hour:minute` strictly after `now`: today if still
/// ahead, otherwise the same time tomorrow. `None` only when the local
/// calendar has no such wall-clock time (e.g. a DST gap).
pub fn next_occurrence(hour: u32, minute: u32, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let today = now
        .with_hour(hour)?
        .with_minute(minute)?
        .with_second(0)?
        .with_nanosecond(0)?;
    if today <= now {
        Some(today + Duration::days(1))
    } else {
        Some(today)
    }
}

/// How the schedule wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Start time reached (or no wait requested).
    Ready,
    /// Shutdown triggered during the wait; the run must not start.
    Interrupted,
}

/// Blocks until the scheduled start time, staying responsive to shutdown.
/// No busy-waiting: a single timer sleep raced against the token.
pub async fn wait_until(spec: ScheduleSpec, shutdown: &ShutdownToken) -> WaitOutcome {
    let ScheduleSpec::At { hour, minute } = spec else {
        return WaitOutcome::Ready;
    };

    let now = Local::now();
    let Some(target) = next_occurrence(hour, minute, now) else {
        tracing::warn!(
            "{:02}:{:02} does not exist on the local calendar today, starting immediately",
            hour,
            minute
        );
        return WaitOutcome::Ready;
    };

    let wait = (target - now).to_std().unwrap_or_default();
    tracing::info!(
        "waiting {}s until scheduled start at {}",
        wait.as_secs(),
        target.format("%Y-%m-%d %H:%M:%S")
    );

    tokio::select! {
        _ = tokio::time::sleep(wait) => {
            tracing::info!("scheduled start time reached");
            WaitOutcome::Ready
        }
        _ = shutdown.cancelled() => {
            tracing::warn!("shutdown requested during schedule wait");
            WaitOutcome::Interrupted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn validates_ranges() {
        assert!(ScheduleSpec::at(0, 0).is_ok());
        assert!(ScheduleSpec::at(23, 59).is_ok());
        assert_eq!(
            ScheduleSpec::at(24, 0),
            Err(ScheduleError::OutOfRange { hour: 24, minute: 0 })
        );
        assert_eq!(
            ScheduleSpec::at(12, 60),
            Err(ScheduleError::OutOfRange { hour: 12, minute: 60 })
        );
    }

    #[test]
    fn future_time_lands_today() {
        let now = local(2025, 6, 10, 8, 30, 0);
        let target = next_occurrence(17, 45, now).unwrap();
        assert_eq!(target, local(2025, 6, 10, 17, 45, 0));
        assert!(target > now);
        assert!(target - now < Duration::days(1));
    }

    #[test]
    fn past_time_rolls_to_tomorrow() {
        let now = local(2025, 6, 10, 18, 0, 0);
        let target = next_occurrence(9, 15, now).unwrap();
        assert_eq!(target.day(), 11);
        assert_eq!((target.hour(), target.minute()), (9, 15));
        assert!(target > now);
        assert!(target - now < Duration::days(1));
    }

    #[test]
    fn exact_now_rolls_to_tomorrow() {
        let now = local(2025, 6, 10, 9, 15, 0);
        let target = next_occurrence(9, 15, now).unwrap();
        assert_eq!(target.day(), 11);
        assert!(target > now);
    }

    #[test]
    fn month_boundary_rollover() {
        let now = local(2025, 1, 31, 23, 50, 0);
        let target = next_occurrence(23, 40, now).unwrap();
        assert_eq!((target.month(), target.day()), (2, 1));
    }

    #[tokio::test]
    async fn immediate_returns_ready_without_waiting() {
        let shutdown = ShutdownToken::new();
        assert_eq!(
            wait_until(ScheduleSpec::Immediate, &shutdown).await,
            WaitOutcome::Ready
        );
    }

    #[tokio::test]
    async fn wait_aborts_on_shutdown() {
        let shutdown = ShutdownToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.trigger();
        });
        // A target minutes away: the wait must end via the token instead.
        let soon = Local::now() + Duration::minutes(5);
        let spec = ScheduleSpec::at(soon.hour(), soon.minute()).unwrap();
        assert_eq!(wait_until(spec, &shutdown).await, WaitOutcome::Interrupted);
    }
}
