//! Conversation discovery: enumerating transcript files in a directory.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use time::OffsetDateTime;
use walkdir::WalkDir;

use super::detect::detect;
use super::types::{ConversationRecord, Provider};
use crate::error::{ConversationError, Result};

pub const TRANSCRIPT_EXTENSION: &str = "json";

/// File name for a conversation called `name`
pub fn transcript_file_name(name: &str) -> String {
    format!("{name}.{TRANSCRIPT_EXTENSION}")
}

/// List every conversation in `dir`, sorted by name.
///
/// A missing directory holds zero conversations. Each `.json` file, or
/// symlink to one, is read once so its provider reflects the current bytes.
/// Names that are not valid UTF-8 are shown lossily; the record keeps the
/// real path so the file can still be renamed or removed.
pub fn list_conversations(dir: &Path) -> Result<Vec<ConversationRecord>> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "conversation directory does not exist");
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            ConversationError::io("listing", path, source)
        })?;
        let path = entry.path();
        if path.extension() != Some(OsStr::new(TRANSCRIPT_EXTENSION)) {
            continue;
        }
        // Follows symlinks, so a link to a transcript counts as a file.
        let meta = match fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "skipping dangling entry");
                continue;
            }
        };
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let name = stem.to_string_lossy();
        if stem.to_str().is_none() {
            tracing::warn!(path = %path.display(), "transcript name is not valid UTF-8");
        }

        let provider = match fs::read(path) {
            Ok(bytes) => detect(&bytes),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unable to read transcript");
                Provider::Unknown
            }
        };
        records.push(ConversationRecord {
            name: name.into_owned(),
            path: path.to_path_buf(),
            provider,
            size: meta.len(),
            modified: meta.modified().ok().map(OffsetDateTime::from),
        });
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(dir = %dir.display(), count = records.len(), "listed conversations");
    Ok(records)
}
