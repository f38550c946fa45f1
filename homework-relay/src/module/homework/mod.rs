//! Homework review status module
//!
//! Polls the review API for submissions changed since a timestamp and turns
//! the newest one into a chat message.

pub mod differ;
pub mod error;
pub mod fetcher;
pub mod types;

use async_trait::async_trait;

pub use differ::{diff, parse_status, Outcome};
pub use error::{FetchError, StatusError};
pub use fetcher::{check_response, PracticumClient};
pub use types::{HomeworkRecord, HomeworkStatus, StatusReport};

/// Anything that can report homework statuses changed since `from_date` (Unix seconds).
#[async_trait]
pub trait HomeworkSource {
    async fn fetch_statuses(&self, from_date: i64) -> Result<StatusReport, FetchError>;
}
