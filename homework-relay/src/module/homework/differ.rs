use super::error::StatusError;
use super::types::HomeworkRecord;

/// What the latest poll means for the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed inside the poll window.
    NoRecords,
    /// The newest status is already what was last sent.
    Unchanged,
    /// A new message should be delivered.
    Changed(String),
}

/// Render the chat message for a single record.
pub fn parse_status(homework: &HomeworkRecord) -> Result<String, StatusError> {
    let status = homework.parsed_status()?;
    Ok(format!(
        "Review status changed for \"{}\". {}",
        homework.homework_name,
        status.verdict()
    ))
}

/// Decide whether the newest record warrants a notification.
///
/// Every record must carry a known status; only the first one is turned into
/// a message, since the API lists records newest-first.
pub fn diff(homeworks: &[HomeworkRecord], last_sent: Option<&str>) -> Result<Outcome, StatusError> {
    for homework in homeworks {
        homework.parsed_status()?;
    }

    let Some(latest) = homeworks.first() else {
        return Ok(Outcome::NoRecords);
    };

    let message = parse_status(latest)?;
    if last_sent == Some(message.as_str()) {
        Ok(Outcome::Unchanged)
    } else {
        Ok(Outcome::Changed(message))
    }
}
