//! Stop conditions: when a `run()` loop ends.

use thiserror::Error;

/// No registered parser accepted the stop-condition text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse stop condition '{text}'")]
pub struct ArgumentError {
    pub text: String,
}

/// A condition checked before every simulated tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop after this many ticks have elapsed since the current `run()`
    /// call began.
    RunTime { ticks: u32 },
    /// Stop once the absolute tick counter reaches this value.
    TickCount { ticks: u32 },
}

impl StopCondition {
    pub(crate) fn should_stop(&self, tick: u32, run_start: u32) -> bool {
        match self {
            StopCondition::RunTime { ticks } => tick.saturating_sub(run_start) >= *ticks,
            StopCondition::TickCount { ticks } => tick >= *ticks,
        }
    }
}

type ConditionParser = fn(&[&str]) -> Option<StopCondition>;

/// Registry of known stop-condition kinds.
///
/// Parsing walks the registered parsers in order and takes the first that
/// accepts the text; unrecognized text is an [`ArgumentError`]. The registry
/// is an explicit, constructed object so embedders can check what a
/// simulator supports without trial and error.
pub struct StopConditionRegistry {
    parsers: Vec<ConditionParser>,
}

impl Default for StopConditionRegistry {
    fn default() -> Self {
        Self {
            parsers: vec![parse_run_time, parse_tick_count],
        }
    }
}

impl StopConditionRegistry {
    pub fn parse(&self, text: &str) -> Result<StopCondition, ArgumentError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        self.parsers
            .iter()
            .find_map(|parser| parser(&words))
            .ok_or_else(|| ArgumentError {
                text: text.to_string(),
            })
    }
}

/// `run_time <n> [seconds|minutes|hours]`; a bare number means ticks, which
/// are one simulated second each.
fn parse_run_time(words: &[&str]) -> Option<StopCondition> {
    let (count, unit) = match words {
        ["run_time", count] => (count, None),
        ["run_time", count, unit] => (count, Some(*unit)),
        _ => return None,
    };
    let count: u32 = count.parse().ok()?;
    let scale = match unit {
        None | Some("second") | Some("seconds") => 1,
        Some("minute") | Some("minutes") => 60,
        Some("hour") | Some("hours") => 3600,
        Some(_) => return None,
    };
    Some(StopCondition::RunTime {
        ticks: count.checked_mul(scale)?,
    })
}

/// `tick_count <n>`: an absolute tick target.
fn parse_tick_count(words: &[&str]) -> Option<StopCondition> {
    match words {
        ["tick_count", count] => Some(StopCondition::TickCount {
            ticks: count.parse().ok()?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_forms() {
        let registry = StopConditionRegistry::default();
        assert_eq!(
            registry.parse("run_time 120 seconds").unwrap(),
            StopCondition::RunTime { ticks: 120 }
        );
        assert_eq!(
            registry.parse("run_time 2 minutes").unwrap(),
            StopCondition::RunTime { ticks: 120 }
        );
        assert_eq!(
            registry.parse("run_time 30").unwrap(),
            StopCondition::RunTime { ticks: 30 }
        );
        assert_eq!(
            registry.parse("tick_count 500").unwrap(),
            StopCondition::TickCount { ticks: 500 }
        );
    }

    #[test]
    fn rejects_unknown_text() {
        let registry = StopConditionRegistry::default();
        let err = registry.parse("voltage below 3.0").unwrap_err();
        assert_eq!(err.text, "voltage below 3.0");
        assert!(registry.parse("run_time twenty seconds").is_err());
        assert!(registry.parse("run_time 5 fortnights").is_err());
    }

    #[test]
    fn run_time_is_relative_and_tick_count_absolute() {
        let relative = StopCondition::RunTime { ticks: 10 };
        assert!(!relative.should_stop(109, 100));
        assert!(relative.should_stop(110, 100));

        let absolute = StopCondition::TickCount { ticks: 110 };
        assert!(!absolute.should_stop(109, 100));
        assert!(absolute.should_stop(110, 0));
    }
}
