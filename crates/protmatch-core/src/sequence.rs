//! Sequence records, FASTA header parsing and pattern scanning.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{ProtmatchError, Result};

/// Identifier of a sequence record, e.g. `Q9Y7B1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Accession(String);

impl Accession {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Accession {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A fetched sequence record. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub accession: Accession,
    /// The full header line, including the leading `>`.
    pub title: String,
    /// Residues with line breaks removed.
    pub sequence: String,
}

/// A record together with every match of the active pattern.
///
/// Matches are byte offsets into `record.sequence`, ascending by start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    pub record: Arc<SequenceRecord>,
    pub matches: Vec<(usize, usize)>,
}

/// Parse a FASTA record. The accession is the second `|` field of the header,
/// as in `>sp|Q9Y7B1|NAME_ORGANISM ...`.
pub fn parse(raw: &str) -> Result<SequenceRecord> {
    let mut lines = raw.trim().lines();
    let title = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| ProtmatchError::Parse("empty record".into()))?;

    let accession = title
        .split('|')
        .nth(1)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| {
            ProtmatchError::Parse(format!("header has no accession field: {title}"))
        })?;

    let sequence: String = lines.map(str::trim).collect();

    Ok(SequenceRecord {
        accession: Accession::new(accession),
        title: title.to_string(),
        sequence,
    })
}

/// Scan `record.sequence` for every match of `pattern`, left to right.
///
/// With no pattern the match list is empty. Zero-width matches are reported
/// and the scan still advances past them.
pub fn match_record(record: Arc<SequenceRecord>, pattern: Option<&Regex>) -> MatchSet {
    let matches = match pattern {
        None => Vec::new(),
        Some(re) => re
            .find_iter(&record.sequence)
            .map(|m| (m.start(), m.end()))
            .collect(),
    };
    MatchSet { record, matches }
}
