//! `wablast-scheduler` — job persistence, timers and delivery.
//!
//! The [`JobStore`] keeps job definitions and execution history in
//! SQLite. The [`Scheduler`] arms one timer task per eligible job and
//! reconciles the registry against the store on an interval. Fired jobs
//! are handed to the [`Dispatcher`], which POSTs them to the messaging
//! service; [`wait_until_healthy`] gates startup on that service.

pub mod db;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod health;
pub mod store;
pub mod types;

pub use dispatch::{DeliveryMode, Dispatcher};
pub use engine::Scheduler;
pub use error::{Result, SchedulerError};
pub use health::wait_until_healthy;
pub use store::JobStore;
pub use types::{Job, JobHistory, JobStatus, JobTrigger, JobUpdate, NewJob, Target};
