//! Reference resolution: turning a user token into conversation records.
//!
//! Tokens are tried in order as an exact name, a 1-based index, a
//! `start-end` range, and finally a glob over `<name>.json`. Indices refer to
//! the listing passed in, so callers must resolve against the same snapshot
//! they act on.

use glob::Pattern;

use crate::error::{ConversationError, Result};
use crate::transcript::{ConversationRecord, TRANSCRIPT_EXTENSION, transcript_file_name};

/// How a non-name token is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// A 1-based position. `None` when the digits overflow.
    Index(Option<i64>),
    Range { start: i64, end: i64 },
    Pattern(String),
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a token without looking at any listing
pub fn parse_token(token: &str) -> Reference {
    let trimmed = token.trim();
    if is_integer(trimmed) {
        return Reference::Index(trimmed.parse().ok());
    }

    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    // Skip the first char so a leading minus is not taken as the separator.
    if let Some(pos) = compact.get(1..).and_then(|rest| rest.find('-')) {
        let (left, right) = (&compact[..=pos], &compact[pos + 2..]);
        if is_integer(left) && is_integer(right) {
            if let (Ok(start), Ok(end)) = (left.parse(), right.parse()) {
                return Reference::Range { start, end };
            }
        }
    }

    let suffix = format!(".{TRANSCRIPT_EXTENSION}");
    if token.ends_with(&suffix) {
        Reference::Pattern(token.to_string())
    } else {
        Reference::Pattern(format!("{token}{suffix}"))
    }
}

fn position(value: i64, raw: &str, len: usize) -> Result<usize> {
    match usize::try_from(value) {
        Ok(pos) if (1..=len).contains(&pos) => Ok(pos - 1),
        _ => Err(ConversationError::OutOfRange {
            index: raw.to_string(),
            len,
        }),
    }
}

/// Resolve `token` against a sorted listing. May return an empty set.
pub fn resolve(token: &str, records: &[ConversationRecord]) -> Result<Vec<ConversationRecord>> {
    if let Some(record) = records
        .iter()
        .find(|r| r.name == token || transcript_file_name(&r.name) == token)
    {
        tracing::debug!(token, name = %record.name, "resolved exact name");
        return Ok(vec![record.clone()]);
    }

    let len = records.len();
    match parse_token(token) {
        Reference::Index(index) => {
            let raw = token.trim();
            let idx = match index {
                Some(value) => position(value, raw, len)?,
                None => {
                    return Err(ConversationError::OutOfRange {
                        index: raw.to_string(),
                        len,
                    });
                }
            };
            tracing::debug!(token, index = idx + 1, "resolved index");
            Ok(vec![records[idx].clone()])
        }
        Reference::Range { start, end } => {
            let first = position(start, &start.to_string(), len)?;
            let last = position(end, &end.to_string(), len)?;
            if first > last {
                return Err(ConversationError::InvalidRange { start, end });
            }
            tracing::debug!(token, start, end, "resolved range");
            Ok(records[first..=last].to_vec())
        }
        Reference::Pattern(pattern) => {
            let compiled =
                Pattern::new(&pattern).map_err(|source| ConversationError::InvalidPattern {
                    pattern: token.to_string(),
                    source,
                })?;
            let matched: Vec<_> = records
                .iter()
                .filter(|r| compiled.matches(&transcript_file_name(&r.name)))
                .cloned()
                .collect();
            tracing::debug!(token, pattern = %pattern, count = matched.len(), "resolved pattern");
            Ok(matched)
        }
    }
}
