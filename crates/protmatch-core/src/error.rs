use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtmatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sequence parse error: {0}")]
    Parse(String),

    #[error("Sequence fetch error: {0}")]
    Fetch(String),

    #[error("Highlight error: {0}")]
    Highlight(#[from] HighlightError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons a set of ranges cannot be spliced into a text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    #[error("range {start}..{end} ends before it starts")]
    Inverted { start: usize, end: usize },

    #[error("range end {end} is past the end of the text ({len})")]
    OutOfBounds { end: usize, len: usize },

    #[error("range starting at {start} overlaps a previous range ending at {previous_end}")]
    Overlap { previous_end: usize, start: usize },

    #[error("offset {offset} does not fall on a character boundary")]
    Misaligned { offset: usize },
}

pub type Result<T> = std::result::Result<T, ProtmatchError>;
