//! Transcript handling: discovery, provider detection, and rendering.

mod detect;
mod discovery;
mod parser;
mod types;

pub use detect::detect;
pub use discovery::{TRANSCRIPT_EXTENSION, list_conversations, transcript_file_name};
pub use parser::{GeminiFormat, OpenAiFormat, TranscriptFormat, normalize_role, render, truncate};
pub use types::{ConversationRecord, Family, Provider, RenderLimits, Rendered, RenderedMessage};
