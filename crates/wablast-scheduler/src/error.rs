use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Messaging service unhealthy after {attempts} attempts")]
    Unhealthy { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
