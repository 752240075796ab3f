//! Sequential list-fetch-print run over one mailbox

use chrono::{DateTime, Utc};
use std::io::Write;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::{self, MailboxClient};
use crate::config::MailboxConfig;
use crate::error::Result;
use crate::subject::extract_subject_with;

/// Exit status when the service client could not be built
pub const EXIT_CLIENT_UNAVAILABLE: i32 = 1;

/// Exit status when the message listing call failed
pub const EXIT_LISTING_FAILED: i32 = 2;

/// What a run printed and how many fetches failed
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub owner: String,
    pub messages_listed: usize,
    pub subjects: Vec<String>,
    pub fetch_failures: Vec<String>,
}

impl RunReport {
    fn new(owner: &str) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            owner: owner.to_string(),
            messages_listed: 0,
            subjects: Vec::new(),
            fetch_failures: Vec::new(),
        }
    }
}

/// Result of one run; maps onto the process exit status
#[derive(Debug)]
pub enum RunOutcome {
    /// Every listed message was processed (some fetches may have failed)
    Completed(RunReport),
    /// The mailbox reported no messages
    NoMessages,
    /// The listing call itself failed
    ListingFailed(String),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(_) | RunOutcome::NoMessages => 0,
            RunOutcome::ListingFailed(_) => EXIT_LISTING_FAILED,
        }
    }
}

/// List up to `max_results` messages for the configured owner and print
/// each subject to `out`.
///
/// A failed fetch prints a diagnostic and moves on to the next message.
/// Only errors writing to `out` are returned as `Err`.
pub async fn run<C, W>(client: &C, settings: &MailboxConfig, out: &mut W) -> Result<RunOutcome>
where
    C: MailboxClient + ?Sized,
    W: Write,
{
    let owner = settings.owner.as_str();
    let header_match = settings.header_match();

    let refs = match client::list_messages(client, owner, settings.max_results).await {
        Ok(refs) => refs,
        Err(e) => {
            writeln!(out, "Unable to list messages: {}", e)?;
            return Ok(RunOutcome::ListingFailed(e.to_string()));
        }
    };

    if refs.is_empty() {
        writeln!(out, "No messages received")?;
        return Ok(RunOutcome::NoMessages);
    }

    let mut report = RunReport::new(owner);
    report.messages_listed = refs.len();
    info!(run_id = %report.run_id, "Processing {} messages for '{}'", refs.len(), owner);
    writeln!(out, "Number of messages: {}", refs.len())?;

    for msg_ref in &refs {
        match client::fetch_message(client, owner, &msg_ref.id).await {
            Ok(message) => {
                let subject = extract_subject_with(&message, header_match);
                writeln!(out, "Email Subject: {}", subject)?;
                report.subjects.push(subject);
            }
            Err(e) => {
                writeln!(
                    out,
                    "Message data not retrieved for message ID {}: {}",
                    msg_ref.id, e
                )?;
                report.fetch_failures.push(msg_ref.id.clone());
            }
        }
    }

    if !report.fetch_failures.is_empty() {
        warn!(
            "{} of {} messages could not be retrieved",
            report.fetch_failures.len(),
            report.messages_listed
        );
    }
    writeln!(
        out,
        "Processed {} messages ({} not retrieved)",
        report.messages_listed,
        report.fetch_failures.len()
    )?;

    Ok(RunOutcome::Completed(report))
}
