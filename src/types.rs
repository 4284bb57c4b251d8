use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// What to do with in-flight generations once one has failed.
///
/// - `Drain`: dispatch nothing new, but let running generations finish and
///   keep their summaries (default behaviour).
/// - `Abort`: cancel running generations immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Drain,
    Abort,
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drain" => Ok(FailureMode::Drain),
            "abort" => Ok(FailureMode::Abort),
            other => Err(format!(
                "invalid failure_mode: {other} (expected \"drain\" or \"abort\")"
            )),
        }
    }
}

/// Parse a duration string such as `"250ms"`, `"3s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit (ms, s, m or h)"))?;

    let (digits, unit) = s.split_at(split);
    if digits.is_empty() {
        return Err(format!("duration '{s}' has no numeric part"));
    }
    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration '{s}': {e}"))?;

    let secs_per_unit: u64 = match unit.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => {
            return Err(format!(
                "unsupported duration unit '{other}' in '{s}'; expected ms, s, m or h"
            ));
        }
    };

    Ok(Duration::from_secs(value.saturating_mul(secs_per_unit)))
}
