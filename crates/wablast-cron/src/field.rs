//! Single-field validation against numeric bounds and special tokens.

/// Bounds and special-token permissions for one cron field position.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Operator-facing field name, used in error messages.
    pub name: &'static str,
    pub min: u32,
    pub max: u32,
    /// Permit `L` (bare or as an `NL` suffix).
    pub allow_l: bool,
    /// Permit `N#k` (kth occurrence of a weekday).
    pub allow_hash: bool,
}

/// Parse an unsigned decimal integer. Rejects signs, whitespace and any
/// non-digit byte, so `-5` and `+5` never sneak through `str::parse`.
pub(crate) fn parse_num(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Validate one whole field, which may be a comma-separated list.
/// Every part must validate independently; the first bad part fails the
/// whole field.
pub fn is_valid_field(field: &str, spec: &FieldSpec) -> bool {
    field.split(',').all(|part| is_valid_part(part.trim(), spec))
}

fn is_valid_part(part: &str, spec: &FieldSpec) -> bool {
    if part == "*" {
        return true;
    }

    // "*/step"
    if let Some(step) = part.strip_prefix("*/") {
        return matches!(parse_num(step), Some(n) if n >= 1 && n <= spec.max);
    }

    // Plain number.
    if let Some(num) = parse_num(part) {
        return num >= spec.min && num <= spec.max;
    }

    if spec.allow_l {
        if part == "L" {
            return true;
        }
        // "NL" — e.g. "6L" = last Saturday.
        if let Some(num) = part.strip_suffix('L').and_then(parse_num) {
            return num >= spec.min && num <= spec.max;
        }
    }

    // "start-end" with an optional "/step".
    let (range, step) = match part.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (part, None),
    };
    if let Some((start, end)) = range.split_once('-') {
        if let (Some(start), Some(end)) = (parse_num(start), parse_num(end)) {
            let step_ok = match step {
                None => true,
                Some(s) => matches!(parse_num(s), Some(n) if n >= 1 && n <= spec.max),
            };
            return start >= spec.min && start <= end && end <= spec.max && step_ok;
        }
        return false;
    }

    // "num#nth" — nth occurrence is 1..=5.
    if spec.allow_hash {
        if let Some((num, nth)) = part.split_once('#') {
            if let (Some(num), Some(nth)) = (parse_num(num), parse_num(nth)) {
                return num >= spec.min && num <= spec.max && (1..=5).contains(&nth);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: FieldSpec = FieldSpec {
        name: "Minute",
        min: 0,
        max: 59,
        allow_l: false,
        allow_hash: false,
    };

    const DOW: FieldSpec = FieldSpec {
        name: "Day of Week",
        min: 0,
        max: 7,
        allow_l: true,
        allow_hash: true,
    };

    const DOW_NO_HASH: FieldSpec = FieldSpec {
        allow_hash: false,
        ..DOW
    };

    #[test]
    fn wildcard_and_steps() {
        assert!(is_valid_field("*", &PLAIN));
        assert!(is_valid_field("*/15", &PLAIN));
        assert!(!is_valid_field("*/0", &PLAIN));
        assert!(!is_valid_field("*/60", &PLAIN));
    }

    #[test]
    fn plain_numbers_respect_bounds() {
        assert!(is_valid_field("0", &PLAIN));
        assert!(is_valid_field("59", &PLAIN));
        assert!(!is_valid_field("60", &PLAIN));
        assert!(!is_valid_field("8", &DOW_NO_HASH));
    }

    #[test]
    fn negative_and_signed_numbers_rejected() {
        assert!(!is_valid_field("-5", &PLAIN));
        assert!(!is_valid_field("+5", &PLAIN));
        assert!(!is_valid_field("5.0", &PLAIN));
    }

    #[test]
    fn ranges_with_optional_step() {
        assert!(is_valid_field("10-30", &PLAIN));
        assert!(is_valid_field("10-30/2", &PLAIN));
        assert!(is_valid_field("0-7/2", &DOW));
        assert!(!is_valid_field("30-10", &PLAIN));
        assert!(!is_valid_field("10-30/0", &PLAIN));
        assert!(!is_valid_field("10-99", &PLAIN));
    }

    #[test]
    fn lists_short_circuit_on_first_bad_part() {
        assert!(is_valid_field("1,4-10,30", &PLAIN));
        assert!(!is_valid_field("1,99,30", &PLAIN));
        assert!(!is_valid_field("", &PLAIN));
    }

    #[test]
    fn l_tokens_only_where_allowed() {
        assert!(is_valid_field("L", &DOW));
        assert!(is_valid_field("6L", &DOW));
        assert!(is_valid_field("1L,5L", &DOW));
        assert!(!is_valid_field("8L", &DOW));
        assert!(!is_valid_field("L", &PLAIN));
        assert!(!is_valid_field("6L", &PLAIN));
    }

    #[test]
    fn hash_tokens_only_where_allowed() {
        assert!(is_valid_field("6#3", &DOW));
        assert!(!is_valid_field("5#6", &DOW));
        assert!(!is_valid_field("5#0", &DOW));
        assert!(!is_valid_field("8#2", &DOW));
        assert!(!is_valid_field("6#3", &DOW_NO_HASH));
    }
}
