//! Stored chat transcripts: listing, addressing by name/index/range/glob,
//! provider detection, and bounded rendering.

pub mod config;
pub mod error;
pub mod prompt;
pub mod resolve;
pub mod store;
pub mod transcript;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::{ConversationError, Result};
pub use prompt::{Prompter, TerminalPrompter};
pub use resolve::{Reference, parse_token, resolve};
pub use store::{
    ConversationStore, ConversationView, RemovalFailure, RemovalReport, RemoveOutcome, Renamed,
};
pub use transcript::{
    ConversationRecord, Provider, RenderLimits, Rendered, RenderedMessage, detect, render,
};
