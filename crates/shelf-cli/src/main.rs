//! Shelf CLI
//!
//! Command-line interface for Shelf - book catalog search and a personal
//! library.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shelf_core::Config;

mod commands;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - search books and keep a personal library")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Search the public catalog
    Search {
        /// Search query
        query: String,
    },
    /// List or search your library
    #[command(alias = "ls")]
    Library {
        /// Only show books whose title matches
        query: Option<String>,
    },
    /// Add a book from the catalog to your library
    Add {
        /// Catalog query that finds the book
        query: String,
        /// Key of the book in the results (e.g. /works/OL45804W)
        key: String,
    },
    /// Remove a book from your library
    #[command(alias = "rm")]
    Remove {
        /// Key of the book
        key: String,
    },
    /// Log in to the library backend
    Login {
        username: String,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account on the library backend
    Register {
        username: String,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the saved login
    Logout,
    /// Show who is logged in
    Whoami,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (backend_url, catalog_url, remember_login, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file directly
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;

    // Handle TUI (default when no command given)
    let Some(command) = cli.command else {
        return tui::run(&config);
    };
    if matches!(command, Commands::Tui) {
        return tui::run(&config);
    }

    init_cli_logging();

    let mut ctx = commands::open_context(&config)?;

    // Commands that act on an account start from the saved login
    if !matches!(
        command,
        Commands::Login { .. } | Commands::Register { .. } | Commands::Logout
    ) {
        ctx.auto_login();
    }

    match command {
        Commands::Search { query } => commands::book::search(&mut ctx, &query, &output),
        Commands::Library { query } => commands::book::library(&mut ctx, query, &output),
        Commands::Add { query, key } => commands::book::add(&mut ctx, &query, &key, &output),
        Commands::Remove { key } => commands::book::remove(&mut ctx, &key, &output),
        Commands::Login { username, password } => {
            commands::account::login(&mut ctx, &username, password, &output)
        }
        Commands::Register { username, password } => {
            commands::account::register(&mut ctx, &username, password, &output)
        }
        Commands::Logout => commands::account::logout(&mut ctx, &output),
        Commands::Whoami => commands::account::whoami(&ctx, &output),
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr when SHELF_LOG is set
fn init_cli_logging() {
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "shelf_core={0},shelf_cli={0}",
            log_level
        )))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["shelf", "--json", "add", "dune", "/works/OL893415W"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Add { query, key }) => {
                assert_eq!(query, "dune");
                assert_eq!(key, "/works/OL893415W");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_defaults_to_tui() {
        let cli = Cli::try_parse_from(["shelf"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_login_with_password() {
        let cli = Cli::try_parse_from(["shelf", "login", "reader", "-p", "secret"]).unwrap();
        match cli.command {
            Some(Commands::Login { username, password }) => {
                assert_eq!(username, "reader");
                assert_eq!(password.as_deref(), Some("secret"));
            }
            _ => panic!("expected login"),
        }
    }
}
