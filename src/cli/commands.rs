use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use dialoguer::Confirm;
use thiserror::Error;
use tracing::{debug, info};

use crate::export::{export_filename, parse_export_entries, render_html};
use crate::models::ConversationRecord;
use crate::remote::RemoteClient;
use crate::store::{ConversationStore, FsConversationStore};
use crate::tui::run_selector;
use crate::utils::{Config, format_date, format_path_with_tilde, format_project_name};

/// Records above this size are refused by the upload flow
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const USAGE: &str = "\
runlog - Claude Code Conversation Uploader

Usage: runlog [command] [options]

Commands:
  runlog              Upload a conversation (interactive selection)
  runlog del <uuid>   Delete a conversation
  runlog --help       Show this help message

Options:
  -o, --output <file>  Export to an HTML file instead of uploading
  -v, --verbose        Log debug output to stderr
  -V, --version        Print version

Examples:
  runlog                       # Upload a conversation from this project
  runlog --output chat.html    # Export a conversation to HTML
  runlog del <uuid>            # Delete a conversation you uploaded

Environment Variables:
  RUNLOG_API_ENDPOINT  API endpoint (default: https://api.runlog.io)
  CLAUDE_DIR           Claude projects directory (default: ~/.claude/projects)
  RUNLOG_LOG           Log filter (default: warn)
";

#[derive(Parser, Debug)]
#[command(name = "runlog")]
#[command(version)]
#[command(about = "Upload or export Claude Code conversations", long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Export the selected conversation to an HTML file
    #[arg(short = 'o', long = "output", value_name = "FILE", num_args = 0..=1)]
    pub output: Option<Option<String>>,

    /// Show usage
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Subcommand and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload,
    Export { filename: Option<String> },
    Delete { id: String },
    Help,
}

/// Invalid invocation. The caller prints usage after the message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("--output requires a filename")]
    MissingOutputFile,

    #[error("Missing conversation UUID\nUsage: runlog del <uuid>")]
    MissingId,

    #[error("Unknown command \"{0}\"")]
    UnknownCommand(String),
}

impl Cli {
    pub fn command(&self) -> Result<Command, UsageError> {
        if self.help {
            return Ok(Command::Help);
        }

        if let Some(first) = self.args.first() {
            return match first.as_str() {
                "del" | "delete" => match self.args.get(1).map(|id| id.trim()) {
                    Some(id) if !id.is_empty() => Ok(Command::Delete { id: id.to_string() }),
                    _ => Err(UsageError::MissingId),
                },
                other => Err(UsageError::UnknownCommand(other.to_string())),
            };
        }

        match &self.output {
            Some(Some(name)) if !name.trim().is_empty() => {
                Ok(Command::Export { filename: Some(name.clone()) })
            }
            Some(_) => Err(UsageError::MissingOutputFile),
            None => Ok(Command::Upload),
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command()? {
        Command::Help => {
            print!("{}", USAGE);
            Ok(())
        }
        Command::Upload => upload_conversation(),
        Command::Export { filename } => export_conversation(filename.as_deref()),
        Command::Delete { id } => delete_conversation(&id),
    }
}

fn upload_conversation() -> Result<()> {
    println!("runlog - Claude Code Conversation Uploader\n");

    let config = Config::load()?;
    let Some((record, content)) = select_conversation(&config)? else {
        return Ok(());
    };

    check_upload_size(content.len())?;

    let confirmed = Confirm::new()
        .with_prompt("Upload this conversation?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;
    if !confirmed {
        println!("Upload cancelled.");
        return Ok(());
    }

    println!("Uploading conversation...");
    let client = RemoteClient::new(&config.api_endpoint, config.client_id()?);
    let response = client.upload(&content)?;
    info!(session = %record.session_id, id = %response.id, "upload complete");

    println!("\nConversation uploaded successfully!\n");
    println!("  ID: {}", response.id);
    if !response.message.is_empty() {
        println!("  {}", response.message);
    }
    println!("  Share URL: {}", client.share_url(&response.id));

    Ok(())
}

fn export_conversation(requested: Option<&str>) -> Result<()> {
    println!("runlog - Claude Code Conversation Exporter\n");

    let config = Config::load()?;
    let Some((record, content)) = select_conversation(&config)? else {
        return Ok(());
    };

    println!("Generating HTML export...");
    let entries = parse_export_entries(&content);
    let now = Utc::now();
    let html = render_html(&record, &entries, now);

    let filename = export_filename(requested, &record, now);
    let output_path = current_dir()?.join(&filename);
    fs::write(&output_path, &html)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    debug!(path = %output_path.display(), entries = entries.len(), "export written");

    println!("\nHTML export completed successfully!\n");
    println!("Export Details:");
    println!("  File: {}", filename);
    println!("  Location: {}", format_path_with_tilde(&output_path));
    println!("  Size: {:.1} KB", html.len() as f64 / 1024.0);

    Ok(())
}

fn delete_conversation(id: &str) -> Result<()> {
    let config = Config::load()?;
    let client = RemoteClient::new(&config.api_endpoint, config.client_id()?);

    println!("Deleting conversation {}...", id);
    client.delete(id)?;
    println!("Conversation has been deleted");

    Ok(())
}

/// List the project's records, run the selector and load the chosen record
///
/// Returns `None` when there is nothing to choose from or the user cancels.
fn select_conversation(config: &Config) -> Result<Option<(ConversationRecord, String)>> {
    let working_dir = current_dir()?;
    let store = FsConversationStore::new(&config.claude_dir);

    println!("Current directory: {}\n", format_path_with_tilde(&working_dir));
    println!("Loading conversations for this project...");

    let records = store.list_conversations(&working_dir)?;
    println!("Found {} conversations", records.len());

    if records.is_empty() {
        print_no_conversations(&working_dir, store.root());
        return Ok(None);
    }

    let Some(record) = run_selector(records, &store, &working_dir)? else {
        println!("\nCancelled.");
        return Ok(None);
    };

    let content = store.read_content(&record.location).context("Error reading conversation")?;
    print_selection(&record, content.len());

    Ok(Some((record, content)))
}

fn print_no_conversations(working_dir: &Path, claude_dir: &Path) {
    println!("\nNo conversations found for this project.");
    println!("Current directory: {}", format_path_with_tilde(working_dir));
    println!("Claude directory: {}", format_path_with_tilde(claude_dir));
}

fn print_selection(record: &ConversationRecord, size_bytes: usize) {
    println!("\nConversation loaded successfully!\n");
    println!("Selected Conversation:");
    println!("  Project: {}", format_project_name(&record.project_label));
    println!("  Summary preview: {}", record.summary_text.as_deref().unwrap_or(""));
    println!("  Messages: {}", record.message_count);
    println!("  Size: {}", format_size_mb(size_bytes));
    println!("  Last activity: {}", format_date(record.last_event_time));
    println!();
}

/// Refuse uploads above [`MAX_UPLOAD_BYTES`]
pub fn check_upload_size(size_bytes: usize) -> Result<()> {
    if size_bytes > MAX_UPLOAD_BYTES {
        bail!(
            "Conversation is too large to upload ({}, limit {})",
            format_size_mb(size_bytes),
            format_size_mb(MAX_UPLOAD_BYTES)
        );
    }
    Ok(())
}

pub fn format_size_mb(size_bytes: usize) -> String {
    format!("{:.2} MB", size_bytes as f64 / (1024.0 * 1024.0))
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().context("Failed to determine current directory")
}
