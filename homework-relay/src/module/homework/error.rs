use thiserror::Error;

/// Failure of a single status poll. Each variant aborts the current cycle only.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("homework API unreachable: {0}")]
    Request(#[source] reqwest::Error),

    #[error("homework API returned HTTP {status}")]
    UnexpectedStatus { status: reqwest::StatusCode },

    #[error("homework API returned malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("homework API response is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("homework API field `{field}` has the wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("homework record #{index} could not be decoded: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// The API reported something outside its documented contract.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("unexpected status `{status}` for homework \"{homework}\"")]
    UnknownStatus { homework: String, status: String },
}
