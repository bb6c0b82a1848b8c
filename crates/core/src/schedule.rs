//! Poll scheduling policies.
//!
//! Two policies are supported: a plain fixed interval, and a set of named
//! run times checked once a minute against the wall clock. The matching
//! logic here is pure; the actual timer loop lives in the API crate.

use std::time::Duration;

use chrono::NaiveTime;

use crate::error::CoreError;

/// Width of the trigger window after each configured run time.
pub const RUN_TIME_WINDOW: Duration = Duration::from_secs(60);

/// How often the scheduler ticks when run times are configured.
pub const RUN_TIME_TICK: Duration = Duration::from_secs(60);

/// When and how sync cycles are triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollPolicy {
    /// Run a cycle on every tick of the given period.
    Interval(Duration),
    /// Tick every [`RUN_TIME_TICK`] and run a cycle when the current
    /// time-of-day falls inside the window after one of these times.
    RunTimes(Vec<NaiveTime>),
}

impl PollPolicy {
    /// Build a policy from configuration values.
    ///
    /// A non-empty `run_times` string selects the named-run-times policy;
    /// otherwise the fixed interval is used. Run times are comma-separated
    /// `HH:MM` or `HH:MM:SS` values; an entry that fails to parse is a
    /// configuration error (startup should fail rather than silently skip
    /// a scheduled run).
    pub fn from_settings(interval_secs: u64, run_times: Option<&str>) -> Result<Self, CoreError> {
        match run_times {
            Some(raw) if !raw.trim().is_empty() => {
                let mut times = Vec::new();
                for entry in raw.split(',') {
                    let entry = entry.trim();
                    let parsed = NaiveTime::parse_from_str(entry, "%H:%M:%S")
                        .or_else(|_| NaiveTime::parse_from_str(entry, "%H:%M"))
                        .map_err(|_| {
                            CoreError::Validation(format!("Invalid run time: \"{entry}\""))
                        })?;
                    times.push(parsed);
                }
                Ok(PollPolicy::RunTimes(times))
            }
            _ => {
                if interval_secs == 0 {
                    return Err(CoreError::Validation(
                        "Poll interval must be greater than zero".to_string(),
                    ));
                }
                Ok(PollPolicy::Interval(Duration::from_secs(interval_secs)))
            }
        }
    }
}

/// Return the first configured run time whose trigger window contains `now`.
///
/// The window is `[t, t + 1 minute)`. The scan stops at the first match so
/// overlapping windows never trigger twice in one tick. A window that
/// starts just before midnight wraps around to the start of the day.
pub fn matched_run_time(now: NaiveTime, run_times: &[NaiveTime]) -> Option<NaiveTime> {
    let window = chrono::Duration::from_std(RUN_TIME_WINDOW).expect("window fits in i64 ms");
    run_times.iter().copied().find(|&t| {
        let end = t + window;
        if end > t {
            now >= t && now < end
        } else {
            // Window crosses midnight.
            now >= t || now < end
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    // -----------------------------------------------------------------------
    // Window matching
    // -----------------------------------------------------------------------

    #[test]
    fn matches_at_exact_run_time() {
        let times = [t(8, 30, 0)];
        assert_eq!(matched_run_time(t(8, 30, 0), &times), Some(t(8, 30, 0)));
    }

    #[test]
    fn matches_inside_window() {
        let times = [t(8, 30, 0)];
        assert_eq!(matched_run_time(t(8, 30, 59), &times), Some(t(8, 30, 0)));
    }

    #[test]
    fn does_not_match_at_window_end() {
        let times = [t(8, 30, 0)];
        assert_eq!(matched_run_time(t(8, 31, 0), &times), None);
    }

    #[test]
    fn does_not_match_before_run_time() {
        let times = [t(8, 30, 0)];
        assert_eq!(matched_run_time(t(8, 29, 59), &times), None);
    }

    #[test]
    fn first_match_wins_for_overlapping_windows() {
        let times = [t(8, 30, 0), t(8, 30, 30)];
        assert_eq!(matched_run_time(t(8, 30, 45), &times), Some(t(8, 30, 0)));
    }

    #[test]
    fn window_wraps_across_midnight() {
        let times = [t(23, 59, 30)];
        assert_eq!(matched_run_time(t(23, 59, 45), &times), Some(t(23, 59, 30)));
        assert_eq!(matched_run_time(t(0, 0, 15), &times), Some(t(23, 59, 30)));
        assert_eq!(matched_run_time(t(0, 0, 30), &times), None);
    }

    // -----------------------------------------------------------------------
    // Policy parsing
    // -----------------------------------------------------------------------

    #[test]
    fn empty_run_times_selects_interval_policy() {
        let policy = PollPolicy::from_settings(300, None).unwrap();
        assert_eq!(policy, PollPolicy::Interval(Duration::from_secs(300)));
    }

    #[test]
    fn blank_run_times_selects_interval_policy() {
        let policy = PollPolicy::from_settings(300, Some("  ")).unwrap();
        assert_eq!(policy, PollPolicy::Interval(Duration::from_secs(300)));
    }

    #[test]
    fn run_times_parse_both_formats() {
        let policy = PollPolicy::from_settings(300, Some("08:30, 17:45:30")).unwrap();
        assert_eq!(
            policy,
            PollPolicy::RunTimes(vec![t(8, 30, 0), t(17, 45, 30)])
        );
    }

    #[test]
    fn invalid_run_time_is_rejected() {
        assert!(PollPolicy::from_settings(300, Some("8h30")).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(PollPolicy::from_settings(0, None).is_err());
    }
}
