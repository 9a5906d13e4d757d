//! Whole-expression validation: 5 or 6 whitespace-separated fields,
//! each checked against its positional bounds.

use serde::Serialize;

use crate::error::CronError;
use crate::field::{is_valid_field, FieldSpec};

const SECOND: FieldSpec = FieldSpec {
    name: "Second",
    min: 0,
    max: 59,
    allow_l: false,
    allow_hash: false,
};
const MINUTE: FieldSpec = FieldSpec {
    name: "Minute",
    ..SECOND
};
const HOUR: FieldSpec = FieldSpec {
    name: "Hour",
    max: 23,
    ..SECOND
};
const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "Day of Month",
    min: 1,
    max: 31,
    allow_l: true,
    allow_hash: false,
};
const MONTH: FieldSpec = FieldSpec {
    name: "Month",
    min: 1,
    max: 12,
    allow_l: false,
    allow_hash: false,
};
// Upper bound 7 is deliberate: 0 and 7 both denote Sunday.
const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "Day of Week",
    min: 0,
    max: 7,
    allow_l: true,
    allow_hash: true,
};

/// Field order for a standard 5-field expression.
pub const FIVE_FIELD_SPECS: [FieldSpec; 5] = [MINUTE, HOUR, DAY_OF_MONTH, MONTH, DAY_OF_WEEK];

/// Field order for a Quartz-style 6-field expression (leading seconds).
pub const SIX_FIELD_SPECS: [FieldSpec; 6] =
    [SECOND, MINUTE, HOUR, DAY_OF_MONTH, MONTH, DAY_OF_WEEK];

/// Validate a full cron expression. Fields are checked left to right and
/// the first violation is returned with the field's name and raw token.
pub fn validate(expr: &str) -> Result<(), CronError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    let specs: &[FieldSpec] = match fields.len() {
        5 => &FIVE_FIELD_SPECS,
        6 => &SIX_FIELD_SPECS,
        n => return Err(CronError::FieldCount(n)),
    };

    for (field, spec) in fields.iter().zip(specs) {
        if !is_valid_field(field, spec) {
            return Err(CronError::InvalidField {
                name: spec.name,
                token: (*field).to_string(),
            });
        }
    }
    Ok(())
}

/// Structured validation outcome for authoring clients.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

/// Validate and report as `{valid, message}` rather than a `Result`.
pub fn check(expr: &str) -> Validation {
    match validate(expr) {
        Ok(()) => Validation {
            valid: true,
            message: "Cron expression is valid.".to_string(),
        },
        Err(e) => Validation {
            valid: false,
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_field_standard_forms() {
        assert!(validate("0 * * * *").is_ok());
        assert!(validate("*/15 * * * *").is_ok());
        assert!(validate("30 18 * * 1-5").is_ok());
        assert!(validate("0 12 * * 6#3").is_ok());
        assert!(validate("10-30/2 2 12 8 0").is_ok());
        assert!(validate("0 0 6-20/2,L 2 *").is_ok());
        assert!(validate("0 0 L * *").is_ok());
    }

    #[test]
    fn six_field_quartz_forms() {
        assert!(validate("* * * * * *").is_ok());
        assert!(validate("0 * * 1,4-10,L * *").is_ok());
        assert!(validate("0 0 0 * * 4,6L").is_ok());
        assert!(validate("0 0 0 * * 1L,5L").is_ok());
    }

    #[test]
    fn field_count_errors() {
        assert_eq!(validate(""), Err(CronError::FieldCount(0)));
        assert_eq!(validate("* * * *"), Err(CronError::FieldCount(4)));
        assert_eq!(validate("* * * * * * *"), Err(CronError::FieldCount(7)));
    }

    #[test]
    fn first_failing_field_is_reported() {
        assert_eq!(
            validate("99 99 * * *"),
            Err(CronError::InvalidField {
                name: "Minute",
                token: "99".to_string(),
            })
        );
        assert_eq!(
            validate("0 0 32 * *"),
            Err(CronError::InvalidField {
                name: "Day of Month",
                token: "32".to_string(),
            })
        );
    }

    #[test]
    fn day_of_week_seven_is_sunday_alias() {
        assert!(validate("10 2 12 8 7").is_ok());
        assert!(validate("* * * * 8").is_err());
    }

    #[test]
    fn l_not_allowed_in_minute_or_month() {
        assert!(validate("L * * * *").is_err());
        assert!(validate("* * * L *").is_err());
    }

    #[test]
    fn leading_and_trailing_whitespace_tolerated() {
        assert!(validate("  0 9 * * *  ").is_ok());
    }

    #[test]
    fn check_reports_structured_outcome() {
        let ok = check("0 9 * * *");
        assert!(ok.valid);
        let bad = check("0 9 * *");
        assert!(!bad.valid);
        assert!(bad.message.contains("field count"));
    }
}
