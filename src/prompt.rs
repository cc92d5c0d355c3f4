//! User interaction used by destructive and interactive operations.

use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use std::io;

/// Confirmation and selection, injected so the store can run headless.
pub trait Prompter {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;

    /// Pick one of `items`, or `None` when the user backs out
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<Option<usize>>;
}

/// Interactive prompts on the controlling terminal
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(io::Error::other)
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<Option<usize>> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(io::Error::other)
    }
}
