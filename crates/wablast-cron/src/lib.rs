//! `wablast-cron` — cron expression validation, translation and evaluation.
//!
//! # Overview
//!
//! Accepts standard 5-field expressions (minute hour day-of-month month
//! day-of-week) and 6-field Quartz-style expressions with a leading
//! seconds field. Day-of-month admits `L` (last day); day-of-week admits
//! `L` suffixes and `N#k` (kth weekday) and accepts both 0 and 7 as
//! Sunday.
//!
//! Three independent surfaces over the same grammar:
//!
//! | Module      | Purpose                                              |
//! |-------------|------------------------------------------------------|
//! | `validate`  | Field-by-field validation with the first violation   |
//! | `translate` | Human-readable English description                   |
//! | `eval`      | Timezone-aware next fire times                       |

pub mod error;
pub mod eval;
pub mod field;
pub mod translate;
pub mod validate;

use serde::Serialize;

pub use error::CronError;
pub use eval::{next_runs, next_runs_after, parse_tz};
pub use translate::translate;
pub use validate::{validate, Validation};

/// Number of upcoming fire times returned when the caller does not ask
/// for a specific count.
pub const DEFAULT_PREVIEW_COUNT: usize = 5;

/// Bundle returned to authoring clients previewing an expression.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub description: String,
    #[serde(rename = "nextRuns")]
    pub next_runs: Vec<String>,
}

/// Describe `expr` and compute its next `count` fire times in `tz`.
pub fn preview(expr: &str, tz: chrono_tz::Tz, count: usize) -> Result<Preview, CronError> {
    let description = translate::translate(expr)?;
    let next_runs = eval::next_runs(expr, tz, count)?
        .iter()
        .map(|dt| dt.to_rfc3339())
        .collect();
    Ok(Preview {
        description,
        next_runs,
    })
}
