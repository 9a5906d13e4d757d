//! Job domain types shared by the store, the engine and the dispatcher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Activation state, persisted as an integer (1 = active, 0 = inactive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Inactive,
}

impl JobStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            JobStatus::Active => 1,
            JobStatus::Inactive => 0,
        }
    }

    /// Any value other than 1 is treated as inactive.
    pub fn from_i64(value: i64) -> Self {
        if value == 1 {
            JobStatus::Active
        } else {
            JobStatus::Inactive
        }
    }
}

/// Delivery kind a job requests when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTrigger {
    SendMessage,
    SendGroupMessage,
}

impl FromStr for JobTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send_message" => Ok(JobTrigger::SendMessage),
            "send_group_message" => Ok(JobTrigger::SendGroupMessage),
            other => Err(format!("unknown job trigger: {other}")),
        }
    }
}

impl fmt::Display for JobTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobTrigger::SendMessage => "send_message",
            JobTrigger::SendGroupMessage => "send_group_message",
        };
        f.write_str(s)
    }
}

/// Delivery target decomposed from the stored `"displayName|deliveryId"`
/// form. A raw value without a separator is taken as a bare delivery id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub display_name: String,
    pub delivery_id: String,
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('|') {
            Some((name, id)) => Target {
                display_name: name.to_string(),
                delivery_id: id.to_string(),
            },
            None => Target {
                display_name: String::new(),
                delivery_id: raw.to_string(),
            },
        }
    }
}

/// A persisted job row.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: i64,
    pub name: String,
    /// Raw trigger string; parsed into a [`JobTrigger`] at fire time so a
    /// bad row degrades to a logged skip instead of a load failure.
    pub trigger: String,
    /// Raw `"displayName|deliveryId"` target.
    pub target: String,
    pub message: String,
    pub cron_expression: String,
    pub status: JobStatus,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

/// Fields required to create a job. Status starts active.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub name: String,
    pub trigger: String,
    pub target: String,
    pub message: String,
    pub cron_expression: String,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobUpdate {
    pub name: Option<String>,
    pub trigger: Option<String>,
    pub target: Option<String>,
    pub message: Option<String>,
    pub cron_expression: Option<String>,
    pub status: Option<JobStatus>,
}

/// One recorded job execution.
#[derive(Debug, Clone, Serialize)]
pub struct JobHistory {
    pub id: i64,
    pub job_name: String,
    pub execute_time: String,
    pub complete_time: String,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_round_trip() {
        assert_eq!(
            "send_message".parse::<JobTrigger>().unwrap(),
            JobTrigger::SendMessage
        );
        assert_eq!(
            "send_group_message".parse::<JobTrigger>().unwrap(),
            JobTrigger::SendGroupMessage
        );
        assert!("broadcast".parse::<JobTrigger>().is_err());
        assert_eq!(JobTrigger::SendMessage.to_string(), "send_message");
    }

    #[test]
    fn target_splits_on_first_pipe() {
        let t = Target::parse("Budi|628123456789");
        assert_eq!(t.display_name, "Budi");
        assert_eq!(t.delivery_id, "628123456789");

        let t = Target::parse("Tim|IT|12036@g.us");
        assert_eq!(t.display_name, "Tim");
        assert_eq!(t.delivery_id, "IT|12036@g.us");
    }

    #[test]
    fn target_without_separator_is_a_bare_id() {
        let t = Target::parse("628123456789");
        assert_eq!(t.display_name, "");
        assert_eq!(t.delivery_id, "628123456789");
    }

    #[test]
    fn status_integer_mapping() {
        assert_eq!(JobStatus::Active.as_i64(), 1);
        assert_eq!(JobStatus::Inactive.as_i64(), 0);
        assert_eq!(JobStatus::from_i64(1), JobStatus::Active);
        assert_eq!(JobStatus::from_i64(0), JobStatus::Inactive);
        assert_eq!(JobStatus::from_i64(-3), JobStatus::Inactive);
    }
}
