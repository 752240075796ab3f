//! Gmail Subject Reader
//!
//! Authorizes against the Gmail API with OAuth2, lists the most recent
//! messages of one mailbox and prints each message's subject line.
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_subject_reader::{client, config::Config, runner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     // Loads credentials.json, reusing the cached token when present
//!     let client = client::build_client(&config).await?;
//!
//!     let mut stdout = std::io::stdout();
//!     let outcome = runner::run(&client, &config.mailbox, &mut stdout).await?;
//!     std::process::exit(outcome.exit_code());
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - Client secret loading, token cache and the installed-app flow
//! - [`client`] - Gmail hub construction, message listing and fetching
//! - [`cli`] - Command-line interface and command handlers
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`models`] - Message references, messages, payloads and headers
//! - [`runner`] - The list, fetch and print loop with its exit-code contract
//! - [`subject`] - Header lookup and subject extraction

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod runner;
pub mod subject;

pub use error::{GmailError, Result};

pub use models::{Header, Message, MessageRef, Payload};

pub use auth::{obtain_credential, Credential};

pub use client::{build_client, fetch_message, list_messages, MailboxClient, ProductionGmailClient};

pub use config::{AuthConfig, Config, MailboxConfig};

pub use runner::{run, RunOutcome, RunReport};

pub use subject::{extract_header, extract_subject, HeaderMatch};
