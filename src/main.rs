use anyhow::Result;
use clap::Parser;
use gmail_subject_reader::cli::{self, Cli, Commands};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("\nFor help, run: gmail-subjects --help");
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    // Install default crypto provider for rustls
    // On non-Windows platforms, use aws-lc-rs; on Windows, use ring
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_subject_reader=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_subject_reader=info,warn"))
    };

    // Logs go to stderr; stdout carries subjects and per-message diagnostics
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let mut stdout = std::io::stdout().lock();

    match cli.command() {
        Commands::InitConfig { output, force } => {
            cli::run_init_config(&output, force, &mut stdout).await?;
            Ok(0)
        }
        Commands::Auth { force } => {
            let config = cli.load_config().await?;
            tracing::info!("Authenticating with Gmail API...");
            cli::run_auth(&config, force, &mut stdout).await?;
            Ok(0)
        }
        Commands::List => {
            let config = cli.load_config().await?;
            let code = cli::run_list(&config, &mut stdout).await?;
            Ok(code)
        }
    }
}
