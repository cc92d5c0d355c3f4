//! Conversation command output.

use anyhow::{Result, bail};
use serde::Serialize;
use std::io::{self, Write};
use time::format_description::{self, BorrowedFormatItem};
use time::{OffsetDateTime, UtcOffset};

use chatkeep::{
    ConversationRecord, ConversationStore, Prompter, RemoveOutcome, RenderLimits, Rendered,
};

#[derive(Serialize)]
struct ListEntry<'a> {
    index: usize,
    #[serde(flatten)]
    record: &'a ConversationRecord,
}

#[derive(Serialize)]
struct InfoJson<'a> {
    #[serde(flatten)]
    record: &'a ConversationRecord,
    #[serde(flatten)]
    rendered: &'a Rendered,
}

fn timestamp_format() -> Result<Vec<BorrowedFormatItem<'static>>> {
    Ok(format_description::parse("[year]-[month]-[day] [hour]:[minute]")?)
}

fn format_modified(modified: Option<OffsetDateTime>, format: &[BorrowedFormatItem<'_>]) -> String {
    let Some(modified) = modified else {
        return "-".to_string();
    };
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    modified.to_offset(offset).format(format).unwrap_or_default()
}

/// Numbered listing, or JSON for scripts
pub fn list(store: &ConversationStore, json: bool) -> Result<()> {
    let records = store.list()?;

    if json {
        let entries: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(i, record)| ListEntry {
                index: i + 1,
                record,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }

    let format = timestamp_format()?;
    let width = records.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
    for (i, record) in records.iter().enumerate() {
        println!(
            "{:>3}. {:<width$}  {:<17}  {}",
            i + 1,
            record.name,
            record.provider.as_str(),
            format_modified(record.modified, &format),
        );
    }
    Ok(())
}

pub fn remove(
    store: &ConversationStore,
    target: Option<&str>,
    force: bool,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let outcome = store.remove(target, force, prompter)?;
    report_removal(outcome, target)
}

pub fn clear(store: &ConversationStore, force: bool, prompter: &mut dyn Prompter) -> Result<()> {
    let outcome = store.clear(force, prompter)?;
    report_removal(outcome, None)
}

fn report_removal(outcome: RemoveOutcome, target: Option<&str>) -> Result<()> {
    write_removal(
        outcome,
        target,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
}

/// Print one line per file, then fail if any deletion did not happen.
fn write_removal(
    outcome: RemoveOutcome,
    target: Option<&str>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let report = match outcome {
        RemoveOutcome::NoMatches => {
            match target {
                Some(token) => writeln!(out, "No conversations match '{token}'.")?,
                None => writeln!(out, "No conversations found.")?,
            }
            return Ok(());
        }
        RemoveOutcome::Cancelled => {
            writeln!(out, "Removal cancelled.")?;
            return Ok(());
        }
        RemoveOutcome::Completed(report) => report,
    };

    for path in &report.removed {
        writeln!(out, "Removed {}", path.display())?;
    }
    for failure in &report.failed {
        writeln!(err, "Failed to remove {}: {}", failure.path.display(), failure.error)?;
    }
    if !report.is_complete() {
        bail!(
            "{} of {} conversations could not be removed",
            report.failed.len(),
            report.failed.len() + report.removed.len()
        );
    }
    Ok(())
}

pub fn rename(store: &ConversationStore, old: &str, new: &str) -> Result<()> {
    let renamed = store.rename(old, new)?;
    println!(
        "Renamed {} -> {}",
        renamed.from.display(),
        renamed.to.display()
    );
    Ok(())
}

pub fn info(store: &ConversationStore, target: &str, limits: RenderLimits, json: bool) -> Result<()> {
    let view = store.info(target, limits)?;
    let record = &view.record;
    let rendered = &view.rendered;

    if json {
        let out = InfoJson { record, rendered };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let format = timestamp_format()?;
    println!("Name:       {}", record.name);
    println!("Path:       {}", record.path.display());
    println!("Provider:   {}", record.provider.display_name());
    println!("Size:       {} bytes", record.size);
    println!("Modified:   {}", format_modified(record.modified, &format));

    if rendered.unrecognized {
        println!();
        println!("Unrecognized transcript format; nothing to display.");
        return Ok(());
    }

    println!("Messages:   {}", rendered.total);
    println!();
    if rendered.omitted() > 0 {
        println!("... {} earlier messages omitted", rendered.omitted());
        println!();
    }
    for message in &rendered.messages {
        println!("[{}] {}", message.role, message.content);
    }
    Ok(())
}
