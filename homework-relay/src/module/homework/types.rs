//! Homework review API data types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StatusError;

/// One submission as reported by the review API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkRecord {
    pub id: u64,
    pub homework_name: String,
    /// Raw status code, e.g. "approved". Parsed lazily so that an unknown
    /// code surfaces as a contract violation rather than a decode error.
    pub status: String,
    /// Review timestamp, e.g. "2026-10-19T10:15:00Z"
    pub date_updated: String,
    #[serde(default)]
    pub lesson_name: Option<String>,
    #[serde(default)]
    pub reviewer_comment: Option<String>,
}

impl HomeworkRecord {
    pub fn parsed_status(&self) -> Result<HomeworkStatus, StatusError> {
        self.status.parse().map_err(|_| StatusError::UnknownStatus {
            homework: self.homework_name.clone(),
            status: self.status.clone(),
        })
    }
}

/// Review outcome codes the API is known to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "The work has been reviewed: the reviewer liked everything. Hooray!",
            HomeworkStatus::Reviewing => "The work has been taken for review by the reviewer.",
            HomeworkStatus::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated payload of one status poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Records changed inside the requested window (newest first, per the API)
    pub homeworks: Vec<HomeworkRecord>,
    /// Server clock at response time, Unix seconds
    pub current_date: Option<i64>,
}
