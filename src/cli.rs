// CLI module - command-line argument parsing and handlers
//
// Without a subcommand the binary runs the HTTP server. Subcommands cover
// the chores around it:
// - config: show, locate or reset the config file
// - check: run the validator against an address or a whole submission
// - projects: list the showcase or import cards from a JSON file
// - messages: read the contact inbox

use crate::config::{Config, VERSION};
use crate::projects::{Project, ProjectFeed};
use crate::store::Store;
use crate::validation::{DomainTables, Submission, Validator};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// folio - portfolio backend
#[derive(Parser)]
#[command(name = "folio")]
#[command(version = VERSION)]
#[command(about = "Portfolio backend: project showcase and contact form", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Validate an email address (and optionally a full submission)
    Check {
        /// Email address to check
        #[arg(long)]
        email: String,

        /// Sender name; with --message, validates the whole form
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        message: Option<String>,
    },

    /// Showcase projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Contact form inbox
    Messages {
        #[command(subcommand)]
        action: MessagesAction,
    },
}

#[derive(Subcommand)]
pub enum ProjectsAction {
    /// List projects as the site would see them
    List,
    /// Import projects from a JSON array
    Import { path: PathBuf },
}

#[derive(Subcommand)]
pub enum MessagesAction {
    /// List the most recent messages
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print one message and mark it read
    Read { id: String },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli() -> bool {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return false; // No subcommand, run the server
    };

    let result = match command {
        Commands::Config { show, reset, path } => {
            if path {
                handle_config_path()
            } else if show {
                handle_config_show()
            } else if reset {
                handle_config_reset()
            } else {
                println!("Usage: folio config [--show|--reset|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --path    Show config file path");
                Ok(())
            }
        }
        Commands::Check {
            email,
            name,
            message,
        } => handle_check(email, name, message),
        Commands::Projects { action } => handle_projects(action),
        Commands::Messages { action } => handle_messages(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    true
}

fn load_config() -> Result<Config> {
    Config::from_env().context("Failed to load configuration")
}

fn load_validator(config: &Config) -> Result<Validator> {
    let tables = DomainTables::load(config.tables_path.as_deref())?;
    Ok(Validator::new(tables))
}

// ─────────────────────────────────────────────────────────────────────────────
// config
// ─────────────────────────────────────────────────────────────────────────────

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = load_config()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

fn handle_check(email: String, name: Option<String>, message: Option<String>) -> Result<()> {
    let config = load_config()?;
    let validator = load_validator(&config)?;

    let valid = if name.is_some() || message.is_some() {
        let submission = Submission::new(
            name.unwrap_or_default(),
            email,
            message.unwrap_or_default(),
        );
        let result = validator.validate_form(&submission);
        println!("{}", serde_json::to_string_pretty(&result)?);
        result.is_valid
    } else {
        let result = validator.validate_email(&email);
        println!("{}", serde_json::to_string_pretty(&result)?);
        result.is_valid
    };

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// projects
// ─────────────────────────────────────────────────────────────────────────────

fn handle_projects(action: ProjectsAction) -> Result<()> {
    let config = load_config()?;
    let store = Store::open(&config.db_path)?;

    match action {
        ProjectsAction::List => {
            let feed = ProjectFeed::load(&store);
            println!("{}", serde_json::to_string_pretty(&feed)?);
        }
        ProjectsAction::Import { path } => {
            let projects = read_projects(&path)?;
            for project in &projects {
                let id = store.insert_project(project)?;
                println!("  ✓ {} ({})", project.title, id);
            }
            println!(
                "Imported {} project(s) into {}",
                projects.len(),
                config.db_path.display()
            );
        }
    }
    Ok(())
}

fn read_projects(path: &Path) -> Result<Vec<Project>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Expected a JSON array of projects in {}", path.display()))
}

// ─────────────────────────────────────────────────────────────────────────────
// messages
// ─────────────────────────────────────────────────────────────────────────────

fn handle_messages(action: MessagesAction) -> Result<()> {
    let config = load_config()?;
    let store = Store::open(&config.db_path)?;

    match action {
        MessagesAction::List { limit } => {
            let messages = store.messages(limit)?;
            if messages.is_empty() {
                println!("No messages.");
            }
            for m in &messages {
                let marker = if m.read { " " } else { "●" };
                println!(
                    "{} {}  {}  {} <{}>",
                    marker,
                    m.id,
                    m.timestamp.format("%Y-%m-%d %H:%M"),
                    m.name,
                    m.email
                );
            }
        }
        MessagesAction::Read { id } => {
            let message = store
                .message(&id)?
                .with_context(|| format!("No message with id {}", id))?;
            println!("{}", serde_json::to_string_pretty(&message)?);
            store.mark_read(&id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_with_full_submission() {
        let cli = Cli::try_parse_from([
            "folio", "check", "--email", "a@b.co", "--name", "Ada", "--message", "hi",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Check { email, name, .. }) => {
                assert_eq!(email, "a@b.co");
                assert_eq!(name.as_deref(), Some("Ada"));
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn messages_list_defaults_limit() {
        let cli = Cli::try_parse_from(["folio", "messages", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Messages {
                action: MessagesAction::List { limit: 20 }
            })
        ));
    }

    #[test]
    fn no_subcommand_runs_server() {
        let cli = Cli::try_parse_from(["folio"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn read_projects_accepts_partial_cards() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(
            &path,
            r#"[{"title": "Folio", "description": "This site", "tech": ["Rust"]}]"#,
        )
        .unwrap();

        let projects = read_projects(&path).unwrap();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].id.is_empty());
        assert_eq!(projects[0].github, "#");
    }

    #[test]
    fn read_projects_rejects_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, r#"{"title": "x"}"#).unwrap();
        assert!(read_projects(&path).is_err());
    }
}
