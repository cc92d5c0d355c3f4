//! Shared test utilities.
//!
//! All tests that manipulate environment variables must use the shared
//! `env_lock()` to prevent race conditions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::prompt::Prompter;

pub const OPENAI_SAMPLE: &str =
    r#"[{"role":"user","content":"Hi there"},{"role":"assistant","content":"Hello! How can I help?"}]"#;

pub const GEMINI_SAMPLE: &str = r#"{"contents":[{"role":"user","parts":[{"text":"Hi there"}]},{"role":"model","parts":[{"text":"Hello! How can I help?"}]}]}"#;

/// Write `<dir>/<name>.json` and return its path
pub fn write_transcript(dir: &Path, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{name}.json"));
    fs::write(&path, content).unwrap();
    path
}

/// Global lock for tests that modify environment variables.
/// All such tests MUST hold this lock to prevent race conditions.
pub fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for temporarily setting or clearing an environment variable.
pub struct EnvGuard {
    key: String,
    old: Option<String>,
}

impl EnvGuard {
    pub fn set(key: &str, value: &str) -> Self {
        let old = std::env::var(key).ok();
        unsafe {
            std::env::set_var(key, value);
        }
        Self {
            key: key.to_string(),
            old,
        }
    }

    pub fn unset(key: &str) -> Self {
        let old = std::env::var(key).ok();
        unsafe {
            std::env::remove_var(key);
        }
        Self {
            key: key.to_string(),
            old,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(val) = &self.old {
            unsafe {
                std::env::set_var(&self.key, val);
            }
        } else {
            unsafe {
                std::env::remove_var(&self.key);
            }
        }
    }
}

/// Prompter with canned answers that records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    pub confirm_answer: bool,
    pub selection: Option<usize>,
    pub confirm_prompts: Vec<String>,
    pub select_items: Vec<String>,
}

impl ScriptedPrompter {
    pub fn confirming(answer: bool) -> Self {
        Self {
            confirm_answer: answer,
            ..Self::default()
        }
    }

    pub fn selecting(mut self, selection: Option<usize>) -> Self {
        self.selection = selection;
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.confirm_prompts.push(prompt.to_string());
        Ok(self.confirm_answer)
    }

    fn select(&mut self, _prompt: &str, items: &[String]) -> io::Result<Option<usize>> {
        self.select_items = items.to_vec();
        Ok(self.selection)
    }
}
