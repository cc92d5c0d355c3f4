use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::transcript::RenderLimits;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where transcripts live (default: ~/.chatkeep/conversations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversations_dir: Option<PathBuf>,

    /// Messages shown by `info`, most recent last (0 for all)
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Characters shown per message before truncating (0 for no limit)
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_messages() -> usize {
    10
}

fn default_max_chars() -> usize {
    200
}

/// Base directory for config and the default conversation directory
pub fn home_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CHATKEEP_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".chatkeep"))
}

fn config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join("config.toml"))
}

impl Config {
    /// Load config from ~/.chatkeep/config.toml, returning defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.conversations_dir {
            if dir.as_os_str().is_empty() {
                bail!("conversations_dir must not be empty");
            }
        }
        Ok(())
    }

    /// Save config to ~/.chatkeep/config.toml
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Set a value from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "conversations_dir" | "dir" => {
                let value = value.trim();
                if value.is_empty() {
                    bail!("conversations_dir must not be empty");
                }
                self.conversations_dir = Some(PathBuf::from(value));
            }
            "max_messages" | "messages" => {
                self.max_messages = value
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid max_messages: must be a whole number"))?;
            }
            "max_chars" | "chars" => {
                self.max_chars = value
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid max_chars: must be a whole number"))?;
            }
            _ => bail!("unknown config key: {key}"),
        }
        Ok(())
    }

    /// The conversation directory: $CHATKEEP_DIR, then config, then the default
    pub fn conversations_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("CHATKEEP_DIR") {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        match &self.conversations_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(home_dir()?.join("conversations")),
        }
    }

    pub fn render_limits(&self) -> RenderLimits {
        RenderLimits::new(self.max_messages, self.max_chars)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conversations_dir: None,
            max_messages: default_max_messages(),
            max_chars: default_max_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EnvGuard, env_lock};
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let _home = EnvGuard::set("CHATKEEP_HOME", tmp.path().to_str().unwrap());

        let config = Config {
            conversations_dir: Some(PathBuf::from("/data/chats")),
            max_messages: 3,
            max_chars: 80,
        };
        let path = config.save().unwrap();
        assert_eq!(path, tmp.path().join("config.toml"));

        let loaded = Config::load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.conversations_dir, None);
        assert_eq!(config.render_limits(), RenderLimits::new(10, 200));
    }

    #[test]
    fn config_partial_parse() {
        let config = Config::parse("max_chars = 40\n").unwrap();
        assert_eq!(config.max_chars, 40);
        assert_eq!(config.max_messages, 10);
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(Config::parse("conversations_dir = \"\"\n").is_err());
        assert!(Config::parse("max_messages = -1\n").is_err());
        assert!(Config::parse("max_messages = \"ten\"\n").is_err());
    }

    #[test]
    fn config_set_parses_typed_values() {
        let mut config = Config::default();
        config.set("messages", "4").unwrap();
        config.set("max_chars", "0").unwrap();
        config.set("dir", "/tmp/convos").unwrap();
        assert_eq!(config.render_limits(), RenderLimits::new(4, 0));
        assert_eq!(config.conversations_dir, Some(PathBuf::from("/tmp/convos")));

        assert!(config.set("max_chars", "lots").is_err());
        assert!(config.set("dir", " ").is_err());
        assert!(config.set("color", "red").is_err());
    }

    #[test]
    fn conversations_dir_precedence() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let _home = EnvGuard::set("CHATKEEP_HOME", tmp.path().to_str().unwrap());
        let _dir = EnvGuard::unset("CHATKEEP_DIR");

        let mut config = Config::default();
        assert_eq!(
            config.conversations_dir().unwrap(),
            tmp.path().join("conversations")
        );

        config.conversations_dir = Some(PathBuf::from("/from/config"));
        assert_eq!(config.conversations_dir().unwrap(), PathBuf::from("/from/config"));

        let _env = EnvGuard::set("CHATKEEP_DIR", "/from/env");
        assert_eq!(config.conversations_dir().unwrap(), PathBuf::from("/from/env"));
    }
}
