use thiserror::Error;

/// Errors reported while validating, translating or evaluating a cron
/// expression. `Display` output is user-facing: authoring clients show
/// these messages verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("Cron expression is required")]
    Empty,

    #[error("Invalid field count ({0}). Expected 5 or 6 fields.")]
    FieldCount(usize),

    #[error("Invalid {name} field: \"{token}\".")]
    InvalidField { name: &'static str, token: String },
}

pub type Result<T> = std::result::Result<T, CronError>;
