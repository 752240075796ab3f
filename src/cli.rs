//! Command-line interface

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::auth;
use crate::client;
use crate::config::{Config, Overrides};
use crate::error::{GmailError, Result};
use crate::runner::{self, EXIT_CLIENT_UNAVAILABLE};

#[derive(Parser, Debug)]
#[command(name = "gmail-subjects")]
#[command(version)]
#[command(about = "Print the subject lines of your most recent Gmail messages", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Path to OAuth2 client secret file
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Directory holding the cached OAuth2 token
    #[arg(long, global = true)]
    pub token_dir: Option<PathBuf>,

    /// Mailbox owner ("me" is the authenticated account)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Maximum number of messages to list
    #[arg(short = 'n', long, global = true)]
    pub max_results: Option<u32>,

    /// Local port for the OAuth2 redirect
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// List recent messages and print their subjects (default)
    List,

    /// Authenticate with the Gmail API and cache the token
    Auth {
        /// Discard the cached token and re-authorize
        #[arg(long)]
        force: bool,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            credentials_path: self.credentials.clone(),
            token_dir: self.token_dir.clone(),
            owner: self.owner.clone(),
            max_results: self.max_results,
            redirect_port: self.port,
        }
    }

    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::List)
    }

    /// Load the config file and apply command-line overrides
    pub async fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.config).await?;
        config.apply_overrides(self.overrides())?;
        Ok(config)
    }
}

/// Build the client and print subjects; returns the process exit status
pub async fn run_list<W: Write>(config: &Config, out: &mut W) -> Result<i32> {
    let client = match client::build_client(config).await {
        Ok(client) => client,
        Err(e) => {
            error!("Could not build Gmail client: {}", e);
            writeln!(out, "Gmail API not accessible: {}", e)?;
            return Ok(EXIT_CLIENT_UNAVAILABLE);
        }
    };

    let outcome = runner::run(&client, &config.mailbox, out).await?;
    Ok(outcome.exit_code())
}

/// Authorize (or re-authorize with `force`) and report where the token lives
pub async fn run_auth<W: Write>(config: &Config, force: bool, out: &mut W) -> Result<()> {
    if force && auth::clear_token_cache(&config.auth).await? {
        writeln!(out, "Removed existing token cache")?;
    }

    let credential = auth::obtain_credential(&config.auth).await?;
    writeln!(out, "Successfully authenticated with Gmail API")?;
    writeln!(out, "Token cached at: {}", config.auth.token_cache_path().display())?;
    if let Some(expires_at) = credential.expires_at() {
        writeln!(out, "Access token expires at: {}", expires_at)?;
    }
    Ok(())
}

/// Write the default configuration to `output`
pub async fn run_init_config<W: Write>(output: &Path, force: bool, out: &mut W) -> Result<()> {
    if output.exists() && !force {
        return Err(GmailError::ConfigError(format!(
            "{} already exists (use --force to overwrite)",
            output.display()
        )));
    }

    Config::create_example(output).await?;
    info!("Wrote example configuration to {:?}", output);
    writeln!(out, "Created example configuration at {}", output.display())?;
    Ok(())
}
