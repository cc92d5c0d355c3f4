//! Conversation store: listing, resolution, and the operations that mutate
//! the conversation directory.
//!
//! Every operation takes a fresh listing and resolves against it, so indices
//! within one call are consistent. Nothing is locked; another process may
//! change the directory between the listing and the mutation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ConversationError, Result};
use crate::prompt::Prompter;
use crate::resolve::resolve;
use crate::transcript::{
    ConversationRecord, RenderLimits, Rendered, TRANSCRIPT_EXTENSION, detect, list_conversations,
    render, transcript_file_name,
};

const PROMPT_NAME_LIMIT: usize = 5;

/// A file that could not be deleted
#[derive(Debug)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Per-file result of a bulk delete
#[derive(Debug, Default)]
pub struct RemovalReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<RemovalFailure>,
}

impl RemovalReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub enum RemoveOutcome {
    NoMatches,
    Cancelled,
    Completed(RemovalReport),
}

#[derive(Debug)]
pub struct Renamed {
    pub from: PathBuf,
    pub to: PathBuf,
    pub name: String,
}

/// A conversation and its rendered tail
#[derive(Debug)]
pub struct ConversationView {
    pub record: ConversationRecord,
    pub rendered: Rendered,
}

/// Operations over one conversation directory
#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn list(&self) -> Result<Vec<ConversationRecord>> {
        list_conversations(&self.dir)
    }

    /// Resolve a token against a fresh listing
    pub fn resolve(&self, token: &str) -> Result<Vec<ConversationRecord>> {
        let records = self.list()?;
        resolve(token, &records)
    }

    /// Resolve a token that must name exactly one conversation
    pub fn resolve_one(&self, token: &str) -> Result<ConversationRecord> {
        let records = self.list()?;
        if records.is_empty() {
            return Err(ConversationError::not_found(token));
        }
        let mut found = resolve(token, &records)?;
        match found.len() {
            0 => Err(ConversationError::not_found(token)),
            1 => Ok(found.remove(0)),
            count => Err(ConversationError::Ambiguous {
                token: token.to_string(),
                count,
            }),
        }
    }

    /// Remove the conversations `target` resolves to. Without a target the
    /// prompter picks one from the listing.
    pub fn remove(
        &self,
        target: Option<&str>,
        force: bool,
        prompter: &mut dyn Prompter,
    ) -> Result<RemoveOutcome> {
        let records = self.list()?;
        if records.is_empty() {
            return Ok(RemoveOutcome::NoMatches);
        }

        let matched = match target {
            Some(token) => resolve(token, &records)?,
            None => {
                let items: Vec<String> = records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| format!("{}. {} [{}]", i + 1, r.name, r.provider))
                    .collect();
                let choice = prompter
                    .select("Select a conversation to remove", &items)
                    .map_err(|source| ConversationError::Prompt { source })?;
                match choice {
                    Some(idx) if idx < records.len() => vec![records[idx].clone()],
                    _ => return Ok(RemoveOutcome::Cancelled),
                }
            }
        };
        if matched.is_empty() {
            return Ok(RemoveOutcome::NoMatches);
        }
        self.confirm_and_delete(&matched, force, prompter)
    }

    /// Remove every conversation in the directory
    pub fn clear(&self, force: bool, prompter: &mut dyn Prompter) -> Result<RemoveOutcome> {
        let records = self.list()?;
        if records.is_empty() {
            return Ok(RemoveOutcome::NoMatches);
        }
        self.confirm_and_delete(&records, force, prompter)
    }

    fn confirm_and_delete(
        &self,
        records: &[ConversationRecord],
        force: bool,
        prompter: &mut dyn Prompter,
    ) -> Result<RemoveOutcome> {
        if !force {
            let confirmed = prompter
                .confirm(&removal_prompt(records))
                .map_err(|source| ConversationError::Prompt { source })?;
            if !confirmed {
                return Ok(RemoveOutcome::Cancelled);
            }
        }
        Ok(RemoveOutcome::Completed(delete_all(records)))
    }

    /// Rename one conversation. An existing destination is never overwritten.
    pub fn rename(&self, token: &str, new_name: &str) -> Result<Renamed> {
        let name = validate_name(new_name)?;
        let record = self.resolve_one(token)?;
        let to = self.dir.join(transcript_file_name(&name));

        move_without_replacing(&record.path, &to, &name)?;
        tracing::info!(from = %record.path.display(), to = %to.display(), "renamed conversation");
        Ok(Renamed {
            from: record.path,
            to,
            name,
        })
    }

    /// Read one conversation and render its most recent messages
    pub fn info(&self, token: &str, limits: RenderLimits) -> Result<ConversationView> {
        let mut record = self.resolve_one(token)?;
        let bytes =
            fs::read(&record.path).map_err(|err| ConversationError::io("reading", &record.path, err))?;
        record.provider = detect(&bytes);
        let rendered = render(&bytes, record.provider, limits);
        Ok(ConversationView { record, rendered })
    }
}

/// Move `from` to `to`, failing with `Collision` if `to` exists.
///
/// Linking claims the destination atomically, so a file created there by
/// another process is never replaced. Filesystems without hard links fall
/// back to a check followed by a rename.
fn move_without_replacing(from: &Path, to: &Path, name: &str) -> Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ConversationError::Collision {
                name: name.to_string(),
            });
        }
        Err(err) => {
            tracing::debug!(error = %err, "hard link unavailable, renaming in place");
            if fs::symlink_metadata(to).is_ok() {
                return Err(ConversationError::Collision {
                    name: name.to_string(),
                });
            }
            return fs::rename(from, to).map_err(|err| ConversationError::io("renaming", from, err));
        }
    }

    if let Err(err) = fs::remove_file(from) {
        if let Err(undo) = fs::remove_file(to) {
            tracing::warn!(path = %to.display(), error = %undo, "unable to undo partial rename");
        }
        return Err(ConversationError::io("renaming", from, err));
    }
    Ok(())
}

fn validate_name(raw: &str) -> Result<String> {
    let suffix = format!(".{TRANSCRIPT_EXTENSION}");
    let name = raw.trim().strip_suffix(suffix.as_str()).unwrap_or(raw.trim());
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ConversationError::InvalidName {
            name: raw.to_string(),
        });
    }
    Ok(name.to_string())
}

fn removal_prompt(records: &[ConversationRecord]) -> String {
    if let [single] = records {
        return format!("Remove conversation '{}'?", single.name);
    }
    let mut names: Vec<String> = records
        .iter()
        .take(PROMPT_NAME_LIMIT)
        .map(|r| r.name.clone())
        .collect();
    let more = records.len().saturating_sub(PROMPT_NAME_LIMIT);
    if more > 0 {
        names.push(format!("and {more} more"));
    }
    format!(
        "Remove {} conversations ({})?",
        records.len(),
        names.join(", ")
    )
}

/// Delete each file independently; one failure does not stop the rest.
fn delete_all(records: &[ConversationRecord]) -> RemovalReport {
    let mut report = RemovalReport::default();
    for record in records {
        match fs::remove_file(&record.path) {
            Ok(()) => {
                tracing::info!(path = %record.path.display(), "removed conversation");
                report.removed.push(record.path.clone());
            }
            Err(error) => {
                tracing::warn!(path = %record.path.display(), %error, "failed to remove conversation");
                report.failed.push(RemovalFailure {
                    path: record.path.clone(),
                    error,
                });
            }
        }
    }
    report
}
