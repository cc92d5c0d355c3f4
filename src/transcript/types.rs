//! Types for conversation listing and transcript rendering.

use serde::Serialize;
use std::path::PathBuf;
use time::OffsetDateTime;

/// Which provider schema a transcript file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    OpenAi,
    OpenAiCompatible,
    Mistral,
    Gemini,
    Unknown,
}

/// Schema family shared by one or more providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::OpenAiCompatible => "openai-compatible",
            Provider::Mistral => "mistral",
            Provider::Gemini => "gemini",
            Provider::Unknown => "unknown",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::OpenAiCompatible => "OpenAI-compatible",
            Provider::Mistral => "Mistral",
            Provider::Gemini => "Gemini",
            Provider::Unknown => "Unknown",
        }
    }

    /// The reader family for this tag, `None` for unrecognized files
    pub fn family(self) -> Option<Family> {
        match self {
            Provider::OpenAi | Provider::OpenAiCompatible | Provider::Mistral => {
                Some(Family::OpenAi)
            }
            Provider::Gemini => Some(Family::Gemini),
            Provider::Unknown => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored transcript file
#[derive(Debug, Clone, Serialize)]
pub struct ConversationRecord {
    pub name: String,
    pub path: PathBuf,
    pub provider: Provider,
    pub size: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub modified: Option<OffsetDateTime>,
}

/// A message reduced to its displayable text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub role: String,
    pub content: String,
}

/// Bounds applied when rendering. Zero means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    pub max_messages: usize,
    pub max_chars: usize,
}

impl RenderLimits {
    pub const UNBOUNDED: RenderLimits = RenderLimits {
        max_messages: 0,
        max_chars: 0,
    };

    pub fn new(max_messages: usize, max_chars: usize) -> Self {
        Self {
            max_messages,
            max_chars,
        }
    }
}

/// Result of rendering a transcript
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rendered {
    /// The most recent messages, oldest first
    pub messages: Vec<RenderedMessage>,
    /// Message count before the window was applied
    pub total: usize,
    /// Set when the bytes did not match any known schema
    pub unrecognized: bool,
}

impl Rendered {
    pub fn unrecognized() -> Self {
        Self {
            messages: Vec::new(),
            total: 0,
            unrecognized: true,
        }
    }

    /// Number of older messages left out by the window
    pub fn omitted(&self) -> usize {
        self.total.saturating_sub(self.messages.len())
    }
}
