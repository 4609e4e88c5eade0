//! Parses the `YYYY-M-D-H` CLI time arguments and expands them into the
//! list of civil hours a command should operate on.

use chrono::{Datelike, NaiveDateTime, Timelike};
use mds_domain::{MdsError, Result};

/// One `(year, month, day, hour)` civil-time tuple, the same addressing a
/// `ScheduleBlock` uses.
pub type CivilHour = (i32, u32, u32, u32);

/// Parses `"YYYY-M-D-H"` (no zero padding required) into a naive civil
/// datetime at the top of that hour.
pub fn parse_time_arg(raw: &str) -> Result<NaiveDateTime> {
    let parts: Vec<&str> = raw.split('-').collect();
    let [year, month, day, hour] = parts.as_slice() else {
        return Err(MdsError::ValidationError(format!(
            "invalid time argument '{raw}': expected format YYYY-M-D-H"
        )));
    };

    let parse_field = |field: &str, name: &str| {
        field.parse::<u32>().map_err(|_| MdsError::ValidationError(format!("invalid {name} in time argument: {field}")))
    };

    let year: i32 = year.parse().map_err(|_| MdsError::ValidationError(format!("invalid year in time argument: {year}")))?;
    let month = parse_field(month, "month")?;
    let day = parse_field(day, "day")?;
    let hour = parse_field(hour, "hour")?;

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .ok_or_else(|| MdsError::ValidationError(format!("invalid calendar date/time in '{raw}'")))
}

/// Expands a time-max (and optional time-min/interval) into the ascending
/// list of civil hours to process, per the orchestrator's expansion rules:
/// `(time_min, time_max]` if `time_min` is given, otherwise
/// `(time_max - interval_hours, time_max]` with `interval` defaulting to 1.
pub fn expand_block_list(time_min: Option<NaiveDateTime>, time_max: NaiveDateTime, interval_hours: i64) -> Vec<CivilHour> {
    let lower_bound_exclusive = time_min.unwrap_or_else(|| time_max - chrono::Duration::hours(interval_hours.max(1)));

    let mut hours = Vec::new();
    let mut cursor = lower_bound_exclusive + chrono::Duration::hours(1);
    while cursor <= time_max {
        hours.push((cursor.year(), cursor.month(), cursor.day(), cursor.hour()));
        cursor += chrono::Duration::hours(1);
    }
    hours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unpadded_components() {
        let parsed = parse_time_arg("2020-1-11-17").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day(), parsed.hour()), (2020, 1, 11, 17));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_time_arg("2020-1-11").is_err());
        assert!(parse_time_arg("not-a-date-at-all").is_err());
    }

    #[test]
    fn expands_using_interval_when_time_min_absent() {
        let time_max = parse_time_arg("2020-1-1-12").unwrap();
        let hours = expand_block_list(None, time_max, 3);
        assert_eq!(hours, vec![(2020, 1, 1, 10), (2020, 1, 1, 11), (2020, 1, 1, 12)]);
    }

    #[test]
    fn expands_between_time_min_and_time_max_exclusive_inclusive() {
        let time_min = parse_time_arg("2020-1-1-9").unwrap();
        let time_max = parse_time_arg("2020-1-1-12").unwrap();
        let hours = expand_block_list(Some(time_min), time_max, 1);
        assert_eq!(hours, vec![(2020, 1, 1, 10), (2020, 1, 1, 11), (2020, 1, 1, 12)]);
    }
}
