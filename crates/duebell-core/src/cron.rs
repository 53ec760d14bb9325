//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds)
//! Per field: *, N, A-B, */S, A-B/S, N/S and comma-separated lists.
//! Day of week accepts 0-7 (0 and 7 are both Sunday).
//! Example: "0 8-21/3 * * *" = 08:00, 11:00, 14:00, 17:00 and 20:00 every day

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use crate::error::{DuebellError, Result};

/// How many days ahead to look for a match before giving up.
const SEARCH_HORIZON_DAYS: i64 = 366 * 5;

/// A parsed 5-field cron schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    /// Parse a cron expression, rejecting anything out of range.
    pub fn parse(expression: &str) -> Result<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(DuebellError::Cron(format!(
                "'{expression}' has {} fields (need 5: MIN HOUR DOM MON DOW)",
                parts.len()
            )));
        }

        let minutes = parse_field(parts[0], 0, 59)?;
        let hours = parse_field(parts[1], 0, 23)?;
        let days_of_month = parse_field(parts[2], 1, 31)?;
        let months = parse_field(parts[3], 1, 12)?;
        let mut days_of_week: Vec<u32> = parse_field(parts[4], 0, 7)?
            .into_iter()
            .map(|d| d % 7)
            .collect();
        days_of_week.sort_unstable();
        days_of_week.dedup();

        Ok(Self {
            expression: parts.join(" "),
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: !parts[2].starts_with('*'),
            dow_restricted: !parts[4].starts_with('*'),
        })
    }

    /// The normalized expression this schedule was parsed from.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Next fire time strictly after `after`, evaluated in `after`'s timezone.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let local = after.naive_local();
        let start = local.date().and_hms_opt(local.hour(), local.minute(), 0)? + Duration::minutes(1);
        let limit = start + Duration::days(SEARCH_HORIZON_DAYS);

        let mut candidate = start;
        while candidate < limit {
            if !self.months.contains(&candidate.month()) {
                candidate = first_of_next_month(candidate.date())?;
                continue;
            }
            if !self.day_matches(candidate.date()) {
                candidate = candidate.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.hours.contains(&candidate.hour()) {
                candidate = candidate - Duration::minutes(i64::from(candidate.minute())) + Duration::hours(1);
                continue;
            }
            if !self.minutes.contains(&candidate.minute()) {
                candidate += Duration::minutes(1);
                continue;
            }
            // Local times skipped by a DST jump have no mapping; keep searching.
            if let Some(fire) = tz.from_local_datetime(&candidate).earliest() {
                return Some(fire);
            }
            candidate += Duration::minutes(1);
        }

        tracing::warn!("Cron expression '{}' never fires", self.expression);
        None
    }

    /// Classic cron rule: when both DOM and DOW are restricted, either may match.
    /// A field starting with `*` still carries its step (`*/2`), so both lists
    /// are always checked.
    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.days_of_month.contains(&date.day());
        let dow = self.days_of_week.contains(&date.weekday().num_days_from_sunday());
        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }
}

impl FromStr for CronSchedule {
    type Err = DuebellError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
}

/// Parse a cron field into a sorted list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Result<Vec<u32>> {
    let mut values = Vec::new();
    for part in field.split(',') {
        values.extend(parse_part(part, min, max)?);
    }
    values.sort_unstable();
    values.dedup();
    Ok(values)
}

fn parse_part(part: &str, min: u32, max: u32) -> Result<Vec<u32>> {
    let invalid = |why: &str| DuebellError::Cron(format!("field '{part}' {why}"));

    let (range, step) = match part.split_once('/') {
        Some((range, step)) => {
            let step: u32 = step.parse().map_err(|_| invalid("has a non-numeric step"))?;
            if step == 0 {
                return Err(invalid("has a zero step"));
            }
            (range, Some(step))
        }
        None => (part, None),
    };

    let parse_num = |s: &str| -> Result<u32> {
        let n: u32 = s.parse().map_err(|_| invalid("is not a number"))?;
        if n < min || n > max {
            return Err(invalid(&format!("is outside {min}-{max}")));
        }
        Ok(n)
    };

    let (start, end) = if range == "*" {
        (min, max)
    } else if let Some((a, b)) = range.split_once('-') {
        let (a, b) = (parse_num(a)?, parse_num(b)?);
        if a > b {
            return Err(invalid("has a reversed range"));
        }
        (a, b)
    } else {
        let n = parse_num(range)?;
        // "N/S" means "from N to the end, every S".
        (n, if step.is_some() { max } else { n })
    };

    Ok((start..=end).step_by(step.unwrap_or(1) as usize).collect())
}
