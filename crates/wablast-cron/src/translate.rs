//! English rendering of cron expressions, one clause per field.

use crate::error::CronError;
use crate::field::parse_num;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Translate a 5- or 6-field cron expression into an English,
/// comma-joined clause list. Clause order: [seconds], minute, hour,
/// day-of-month, month, day-of-week.
pub fn translate(expr: &str) -> Result<String, CronError> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    let (second, rest): (Option<&str>, &[&str]) = match parts.len() {
        5 => (None, &parts[..]),
        6 => (Some(parts[0]), &parts[1..]),
        n => return Err(CronError::FieldCount(n)),
    };

    let mut clauses = Vec::with_capacity(6);
    if let Some(second) = second {
        clauses.push(describe_second(second));
    }
    clauses.push(describe_unit(rest[0], "minute", "minutes"));
    clauses.push(describe_unit(rest[1], "hour", "hours"));
    clauses.push(describe_day_of_month(rest[2]));
    clauses.push(describe_month(rest[3]));
    clauses.push(describe_day_of_week(rest[4]));

    Ok(clauses.join(", "))
}

/// Seconds only distinguish wildcard, step and literal forms.
fn describe_second(field: &str) -> String {
    if field == "*" || field == "?" {
        return "every second".to_string();
    }
    if let Some(step) = field.strip_prefix("*/") {
        return format!("every {step} seconds");
    }
    format!("at second {field}")
}

/// Generic clause for minute and hour fields.
fn describe_unit(field: &str, singular: &str, plural: &str) -> String {
    if field == "*" || field == "?" {
        return format!("every {singular}");
    }
    if let Some(step) = field.strip_prefix("*/") {
        return format!("every {step} {plural}");
    }
    if field.contains(',') {
        return format!(
            "at {singular}s {}",
            field.split(',').collect::<Vec<_>>().join(", ")
        );
    }
    if let Some((range, step)) = field.split_once('/') {
        if let Some((start, end)) = range.split_once('-') {
            return format!("every {step} {plural} from {start} to {end}");
        }
    }
    if let Some((start, end)) = field.split_once('-') {
        return format!("every {singular} from {start} to {end}");
    }
    format!("at {singular} {field}")
}

fn describe_day_of_month(field: &str) -> String {
    if field == "*" || field == "?" {
        return "every day".to_string();
    }
    if field.contains(',') {
        let items: Vec<String> = field.split(',').map(day_of_month_item).collect();
        return format!("on the {} day(s) of the month", items.join(" and "));
    }
    format!("on the {} day of the month", day_of_month_item(field))
}

fn day_of_month_item(item: &str) -> String {
    if item == "L" {
        return "last".to_string();
    }
    if let Some((range, step)) = item.split_once('/') {
        if let Some((start, end)) = range.split_once('-') {
            return format!("every {step} days from {start} to {end}");
        }
        if range == "*" {
            return format!("every {step} days");
        }
        return format!("every {step} days starting at {range}");
    }
    if let Some((start, end)) = item.split_once('-') {
        return format!("days {start} through {end}");
    }
    match parse_num(item) {
        Some(n) => format!("{n}{}", ordinal_suffix(n)),
        None => item.to_string(),
    }
}

fn describe_month(field: &str) -> String {
    if field == "*" || field == "?" {
        return "every month".to_string();
    }
    if field.contains(',') {
        let items: Vec<&str> = field.split(',').map(month_name).collect();
        return format!("in {}", items.join(" and "));
    }
    if let Some((start, end)) = field.split_once('-') {
        return format!("from {} through {}", month_name(start), month_name(end));
    }
    format!("in {}", month_name(field))
}

/// Numeric 1–12 maps to a month name; anything else passes through.
fn month_name(token: &str) -> &str {
    match parse_num(token) {
        Some(n) if (1..=12).contains(&n) => MONTH_NAMES[(n - 1) as usize],
        _ => token,
    }
}

fn describe_day_of_week(field: &str) -> String {
    if field == "*" || field == "?" {
        return "every day of the week".to_string();
    }
    if field.contains(',') {
        let items: Vec<String> = field.split(',').map(day_of_week_item).collect();
        return format!("on {}", items.join(" and "));
    }
    if let Some((start, end)) = field.split_once('-') {
        return format!(
            "every day from {} to {}",
            day_of_week_item(start),
            day_of_week_item(end)
        );
    }
    format!("on {}", day_of_week_item(field))
}

fn day_of_week_item(item: &str) -> String {
    if let Some(prefix) = item.strip_suffix('L') {
        return match parse_num(prefix) {
            Some(n) => format!("the last {}", day_name(n)),
            // Bare "L" carries no weekday number.
            None => "the last day of the week".to_string(),
        };
    }
    if let Some((day, nth)) = item.split_once('#') {
        if let (Some(day), Some(nth)) = (parse_num(day), parse_num(nth)) {
            return format!("the {nth}{} {}", ordinal_suffix(nth), day_name(day));
        }
    }
    match parse_num(item) {
        Some(n) => day_name(n).to_string(),
        None => item.to_string(),
    }
}

/// Both 0 and 7 resolve to Sunday.
fn day_name(n: u32) -> &'static str {
    DAY_NAMES[(n % 7) as usize]
}

/// English ordinal suffix with the 11th/12th/13th exception.
fn ordinal_suffix(n: u32) -> &'static str {
    match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}
