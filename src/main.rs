use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use chatkeep::{Config, ConversationStore, TerminalPrompter};

mod conversations_cmd;

#[derive(Parser)]
#[command(name = "chatkeep", version, about = "Manage stored chat transcripts")]
struct Cli {
    /// Conversation directory (default from ~/.chatkeep/config.toml or ~/.chatkeep/conversations)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Log resolution and file operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored conversations
    #[command(name = "list", visible_alias = "ls")]
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove conversations by name, index, range (2-5), or glob pattern
    #[command(name = "rm", visible_alias = "remove")]
    Remove {
        /// Conversation to remove; prompts for one when omitted
        #[arg(allow_negative_numbers = true)]
        target: Option<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Rename a conversation
    #[command(name = "rename", visible_alias = "mv")]
    Rename {
        /// Conversation name or index
        #[arg(allow_negative_numbers = true)]
        old: String,
        /// New name (without .json)
        new: String,
    },

    /// Show a conversation's most recent messages
    #[command(name = "info", visible_alias = "show")]
    Info {
        /// Conversation name or index
        #[arg(allow_negative_numbers = true)]
        target: String,
        /// Number of messages to show (0 for all; default from config)
        #[arg(long)]
        messages: Option<usize>,
        /// Characters per message before truncating (0 for no limit; default from config)
        #[arg(long)]
        chars: Option<usize>,
        /// Print the rendered view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove every conversation
    #[command(name = "clear")]
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify config (~/.chatkeep/config.toml)
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current config
    Show,
    /// Set a config value
    Set {
        /// Key to set (conversations_dir, max_messages, max_chars)
        key: String,
        /// Value to set
        value: String,
    },
    /// Reset config to defaults
    Reset,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("chatkeep=debug")
    } else {
        EnvFilter::try_from_env("CHATKEEP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { action } => handle_config(action),
        command => run_conversations(command, cli.dir),
    }
}

fn run_conversations(command: Commands, dir: Option<PathBuf>) -> Result<()> {
    // A broken config.toml only matters to commands that read from it.
    let needs_limits = matches!(
        &command,
        Commands::Info { messages, chars, .. } if messages.is_none() || chars.is_none()
    );
    let config = if dir.is_none() || needs_limits {
        Config::load()?
    } else {
        Config::default()
    };
    let dir = match dir {
        Some(dir) => dir,
        None => config.conversations_dir()?,
    };
    tracing::debug!(dir = %dir.display(), "using conversation directory");
    let store = ConversationStore::new(dir);
    let mut prompter = TerminalPrompter::default();

    match command {
        Commands::List { json } => conversations_cmd::list(&store, json),
        Commands::Remove { target, force } => {
            conversations_cmd::remove(&store, target.as_deref(), force, &mut prompter)
        }
        Commands::Rename { old, new } => conversations_cmd::rename(&store, &old, &new),
        Commands::Info {
            target,
            messages,
            chars,
            json,
        } => {
            let mut limits = config.render_limits();
            if let Some(messages) = messages {
                limits.max_messages = messages;
            }
            if let Some(chars) = chars {
                limits.max_chars = chars;
            }
            conversations_cmd::info(&store, &target, limits, json)
        }
        Commands::Clear { force } => conversations_cmd::clear(&store, force, &mut prompter),
        Commands::Config { action } => handle_config(action),
    }
}

fn handle_config(action: Option<ConfigAction>) -> Result<()> {
    match action {
        None | Some(ConfigAction::Show) => {
            let config = Config::load()?;
            println!(
                "conversations_dir = \"{}\"",
                config.conversations_dir()?.display()
            );
            println!("max_messages = {}", config.max_messages);
            println!("max_chars = {}", config.max_chars);
        }
        Some(ConfigAction::Set { key, value }) => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let path = config.save()?;
            println!("saved to {}", path.display());
        }
        Some(ConfigAction::Reset) => {
            let config = Config::default();
            let path = config.save()?;
            println!("reset to defaults at {}", path.display());
        }
    }
    Ok(())
}
