//! Timezone-aware computation of upcoming fire times.
//!
//! Expressions are matched minute by minute in the target timezone,
//! with seconds enumerated inside a matching minute for the 6-field
//! form. Searching is bounded to one year of minutes per occurrence.
//!
//! **DST handling:**
//! - Spring-forward gaps: local times that don't exist are skipped.
//! - Fall-back overlaps: the earliest (pre-transition) mapping is chosen.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::CronError;
use crate::field::parse_num;

/// One year of minutes — the search horizon per occurrence.
const MAX_MINUTES: i64 = 366 * 24 * 60;

/// Parse a timezone string into a `chrono_tz::Tz`, falling back to UTC.
pub fn parse_tz(tz: &str) -> Tz {
    tz.parse::<Tz>().unwrap_or(chrono_tz::UTC)
}

/// Compute the next `count` fire times for `expr` in `tz`, each strictly
/// after the current instant and strictly increasing.
///
/// Expressions with no occurrence inside the search horizon yield fewer
/// than `count` entries.
pub fn next_runs(expr: &str, tz: Tz, count: usize) -> Result<Vec<DateTime<Utc>>, CronError> {
    next_runs_after(expr, Utc::now(), tz, count)
}

/// Deterministic variant of [`next_runs`]: occurrences strictly after
/// `after` instead of the current instant.
pub fn next_runs_after(
    expr: &str,
    after: DateTime<Utc>,
    tz: Tz,
    count: usize,
) -> Result<Vec<DateTime<Utc>>, CronError> {
    let spec = CronSpec::parse(expr)?;
    let mut results = Vec::with_capacity(count);
    let mut cursor = after;
    for _ in 0..count {
        match next_after(&spec, cursor, tz) {
            Some(next) => {
                results.push(next);
                cursor = next;
            }
            None => break,
        }
    }
    Ok(results)
}

/// A validated expression split into its six positional fields.
/// The 5-field form gets an implicit seconds field of `"0"`.
struct CronSpec {
    second: String,
    minute: String,
    hour: String,
    day_of_month: String,
    month: String,
    day_of_week: String,
}

impl CronSpec {
    fn parse(expr: &str) -> Result<Self, CronError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(CronError::Empty);
        }
        crate::validate::validate(expr)?;

        let fields: Vec<&str> = expr.split_whitespace().collect();
        let (second, rest): (&str, &[&str]) = if fields.len() == 6 {
            (fields[0], &fields[1..])
        } else {
            ("0", &fields[..])
        };

        Ok(Self {
            second: second.to_string(),
            minute: rest[0].to_string(),
            hour: rest[1].to_string(),
            day_of_month: rest[2].to_string(),
            month: rest[3].to_string(),
            day_of_week: rest[4].to_string(),
        })
    }

    /// Minute-level match: everything except the seconds field.
    fn matches_minute(&self, dt: &NaiveDateTime) -> bool {
        field_matches(&self.minute, dt.minute(), 0)
            && field_matches(&self.hour, dt.hour(), 0)
            && field_matches(&self.month, dt.month(), 1)
            && dom_matches(&self.day_of_month, dt.date())
            && dow_matches(&self.day_of_week, dt.date())
    }
}

/// Next occurrence strictly after `after`, evaluated in `tz`, as UTC.
fn next_after(spec: &CronSpec, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let local_after = after.with_timezone(&tz).naive_local();
    // Start at the top of the minute containing `after`: a later second
    // inside that same minute may still qualify.
    let mut candidate = local_after.with_second(0)?.with_nanosecond(0)?;

    for i in 0..MAX_MINUTES {
        if spec.matches_minute(&candidate) {
            // Inside the starting minute only seconds strictly after
            // `after` count; later minutes search from second 0.
            let bound = (i == 0).then(|| local_after.second());
            if let Some(sec) = first_matching_second(&spec.second, bound) {
                if let Some(utc) = resolve_local(candidate.with_second(sec)?, tz) {
                    return Some(utc);
                }
                // DST gap — the whole local minute does not exist.
            }
        }
        candidate += Duration::minutes(1);
    }
    None
}

/// Smallest matching second in 0..=59, strictly greater than `bound`
/// when one is given.
fn first_matching_second(field: &str, bound: Option<u32>) -> Option<u32> {
    let start = bound.map_or(0, |s| s + 1);
    (start..60).find(|&s| field_matches(field, s, 0))
}

/// Map a local wall-clock time back to UTC under the DST policy above.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        chrono::LocalResult::None => None,
    }
}

/// Numeric field match over a comma list: `*`, `*/n`, `n`, `a-b`, `a-b/s`.
/// `min` is the field's lower bound; `*/n` steps are anchored at it, so
/// 1-based fields (day-of-month, month) step from 1.
fn field_matches(field: &str, value: u32, min: u32) -> bool {
    field
        .split(',')
        .any(|part| value_part_matches(part.trim(), value, min))
}

fn value_part_matches(part: &str, value: u32, min: u32) -> bool {
    if part == "*" || part == "?" {
        return true;
    }
    if let Some(step) = part.strip_prefix("*/") {
        return matches!(parse_num(step), Some(n) if n > 0 && value >= min && (value - min) % n == 0);
    }
    if let Some((range, step)) = part.split_once('/') {
        if let (Some((start, end)), Some(step)) = (range.split_once('-'), parse_num(step)) {
            if let (Some(start), Some(end)) = (parse_num(start), parse_num(end)) {
                return step > 0 && value >= start && value <= end && (value - start) % step == 0;
            }
        }
        return false;
    }
    if let Some((start, end)) = part.split_once('-') {
        if let (Some(start), Some(end)) = (parse_num(start), parse_num(end)) {
            return value >= start && value <= end;
        }
        return false;
    }
    parse_num(part) == Some(value)
}

/// Day-of-month match; `L` is the last day of the candidate's month.
fn dom_matches(field: &str, date: NaiveDate) -> bool {
    field.split(',').any(|part| {
        let part = part.trim();
        if part == "L" {
            date.day() == last_day_of_month(date)
        } else {
            value_part_matches(part, date.day(), 1)
        }
    })
}

/// Day-of-week match; weekday numbers are taken modulo 7 so 0 and 7
/// both mean Sunday. Supports `NL` (last weekday occurrence in the
/// month) and `N#k` (kth occurrence).
fn dow_matches(field: &str, date: NaiveDate) -> bool {
    field.split(',').any(|part| dow_part_matches(part.trim(), date))
}

fn dow_part_matches(part: &str, date: NaiveDate) -> bool {
    let weekday = date.weekday().num_days_from_sunday();

    if part == "*" || part == "?" {
        return true;
    }
    // Bare "L" in day-of-week means Saturday.
    if part == "L" {
        return weekday == 6;
    }
    if let Some(prefix) = part.strip_suffix('L') {
        return match parse_num(prefix) {
            Some(n) => n % 7 == weekday && date.day() + 7 > last_day_of_month(date),
            None => false,
        };
    }
    if let Some((day, nth)) = part.split_once('#') {
        return match (parse_num(day), parse_num(nth)) {
            (Some(day), Some(nth)) => {
                day % 7 == weekday && (date.day() - 1) / 7 + 1 == nth
            }
            _ => false,
        };
    }
    if let Some(step) = part.strip_prefix("*/") {
        return matches!(parse_num(step), Some(n) if n > 0 && weekday % n == 0);
    }
    // Plain values and ranges: 7 aliases Sunday, so test both
    // representations of the weekday.
    value_part_matches(part, weekday, 0) || value_part_matches(part, weekday + 7, 0)
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}
