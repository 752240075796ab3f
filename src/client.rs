//! Gmail API client: listing and fetching messages for one mailbox

use async_trait::async_trait;
use google_gmail1::{api, hyper_rustls, hyper_util, Gmail};
use tracing::{debug, info, warn};

use crate::auth::{self, GmailHub};
use crate::config::Config;
use crate::error::{GmailError, Result};
use crate::models::{Message, MessageRef};

/// Trait defining the mailbox operations the runner needs, for easier testing
#[async_trait]
pub trait MailboxClient: Send + Sync {
    /// First page of message references for `owner`, at most `max_results` long
    async fn list_messages(&self, owner: &str, max_results: u32) -> Result<Vec<MessageRef>>;

    /// Full message (headers and MIME tree) by id
    async fn fetch_message(&self, owner: &str, id: &str) -> Result<Message>;
}

/// Production Gmail client
///
/// Owns the authorized hub for the lifetime of the process. Every request
/// carries the configured scope so the cached token is reused.
pub struct ProductionGmailClient {
    hub: GmailHub,
    scope: String,
}

impl ProductionGmailClient {
    /// Create a new client around an authorized hub
    ///
    /// # Arguments
    /// * `hub` - Gmail API hub instance
    /// * `scope` - OAuth2 scope attached to each request
    pub fn new(hub: GmailHub, scope: impl Into<String>) -> Self {
        Self {
            hub,
            scope: scope.into(),
        }
    }

    pub fn hub(&self) -> &GmailHub {
        &self.hub
    }
}

/// Build the authorized service handle
///
/// Loads the client secret and obtains a credential first, so a missing
/// secret fails before any connection is made.
pub async fn build_client(config: &Config) -> Result<ProductionGmailClient> {
    let credential = auth::obtain_credential(&config.auth).await?;
    if let Some(expires_at) = credential.expires_at() {
        debug!(
            "Access token valid until {} (token file existed: {})",
            expires_at,
            credential.had_cached_token()
        );
    }

    // Use HTTP/1 for compatibility with google-gmail1
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .map_err(|e| GmailError::NetworkError(format!("Failed to load TLS roots: {}", e)))?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    let mut hub = Gmail::new(client, credential.into_authenticator());
    hub.user_agent(format!(
        "{}/{}",
        config.mailbox.application_name,
        env!("CARGO_PKG_VERSION")
    ));

    // validate() guarantees at least one scope
    let scope = config
        .auth
        .scopes
        .first()
        .cloned()
        .unwrap_or_else(|| auth::READONLY_SCOPES[0].to_string());

    Ok(ProductionGmailClient::new(hub, scope))
}

#[async_trait]
impl MailboxClient for ProductionGmailClient {
    async fn list_messages(&self, owner: &str, max_results: u32) -> Result<Vec<MessageRef>> {
        let (_, response) = self
            .hub
            .users()
            .messages_list(owner)
            .max_results(max_results)
            .add_scope(&self.scope)
            .doit()
            .await?;

        Ok(refs_from_response(response))
    }

    async fn fetch_message(&self, owner: &str, id: &str) -> Result<Message> {
        let result = self
            .hub
            .users()
            .messages_get(owner, id)
            .format("full")
            .add_scope(&self.scope)
            .doit()
            .await;

        match result {
            Ok((_, msg)) => Message::try_from(msg),
            Err(e) => Err(remap_not_found(GmailError::from(e), id)),
        }
    }
}

/// Convert one page of `users.messages.list` into references
///
/// Entries without an id are skipped; order is preserved.
fn refs_from_response(response: api::ListMessagesResponse) -> Vec<MessageRef> {
    if response.next_page_token.is_some() {
        debug!("More messages available; only the first page is read");
    }

    let mut refs = Vec::new();
    for msg in response.messages.unwrap_or_default() {
        match MessageRef::try_from(msg) {
            Ok(msg_ref) => refs.push(msg_ref),
            Err(e) => warn!("Skipping listed message: {}", e),
        }
    }
    refs
}

/// Name the requested message in a 404 instead of the generic resource text
fn remap_not_found(error: GmailError, id: &str) -> GmailError {
    match error {
        GmailError::MessageNotFound(_) => GmailError::MessageNotFound(id.to_string()),
        other => other,
    }
}

/// List up to `limit` message references for `owner`
///
/// An empty vector means the mailbox reported no messages; a failed call is
/// returned as an error so the two cases stay distinguishable.
pub async fn list_messages<C>(client: &C, owner: &str, limit: u32) -> Result<Vec<MessageRef>>
where
    C: MailboxClient + ?Sized,
{
    if limit == 0 {
        return Err(GmailError::InvalidLimit(limit));
    }

    let mut refs = client.list_messages(owner, limit).await.map_err(|e| {
        warn!("Listing messages for '{}' failed: {}", owner, e);
        e
    })?;

    if refs.is_empty() {
        info!("No messages returned for '{}'", owner);
    }

    // The service treats maxResults as a hint
    refs.truncate(limit as usize);
    Ok(refs)
}

/// Fetch one full message; the caller decides whether to skip on error
pub async fn fetch_message<C>(client: &C, owner: &str, id: &str) -> Result<Message>
where
    C: MailboxClient + ?Sized,
{
    client.fetch_message(owner, id).await.map_err(|e| {
        warn!("Fetching message {} failed: {}", id, e);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Returns a fixed number of refs regardless of the requested page size
    struct OverDeliveringClient {
        available: usize,
        list_calls: AtomicU32,
    }

    #[async_trait]
    impl MailboxClient for OverDeliveringClient {
        async fn list_messages(&self, _owner: &str, _max_results: u32) -> Result<Vec<MessageRef>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.available)
                .map(|i| MessageRef {
                    id: format!("m{}", i),
                    thread_id: format!("t{}", i),
                })
                .collect())
        }

        async fn fetch_message(&self, _owner: &str, id: &str) -> Result<Message> {
            Err(GmailError::MessageNotFound(id.to_string()))
        }
    }

    fn client_with(available: usize) -> OverDeliveringClient {
        OverDeliveringClient {
            available,
            list_calls: AtomicU32::new(0),
        }
    }

    #[tokio::test]
    async fn test_list_messages_caps_results() {
        let client = client_with(25);
        let refs = list_messages(&client, "me", 10).await.unwrap();
        assert_eq!(refs.len(), 10);
        assert_eq!(refs[0].id, "m0");
        assert_eq!(refs[9].id, "m9");
    }

    #[tokio::test]
    async fn test_list_messages_may_return_fewer() {
        let client = client_with(3);
        let refs = list_messages(&client, "me", 10).await.unwrap();
        assert_eq!(refs.len(), 3);
    }

    #[tokio::test]
    async fn test_list_messages_empty_is_ok() {
        let client = client_with(0);
        let refs = list_messages(&client, "me", 10).await.unwrap();
        assert!(refs.is_empty());
    }

    #[tokio::test]
    async fn test_list_messages_rejects_zero_limit() {
        let client = client_with(5);
        let result = list_messages(&client, "me", 0).await;
        assert!(matches!(result, Err(GmailError::InvalidLimit(0))));
        assert_eq!(client.list_calls.load(Ordering::SeqCst), 0);
    }

    fn listed(id: Option<&str>, thread_id: &str) -> api::Message {
        api::Message {
            id: id.map(|s| s.to_string()),
            thread_id: Some(thread_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_refs_from_response_skips_entries_without_id() {
        let response = api::ListMessagesResponse {
            messages: Some(vec![
                listed(Some("a1"), "t1"),
                listed(None, "t2"),
                listed(Some("a3"), "t3"),
                listed(None, "t4"),
                listed(Some("a5"), "t5"),
            ]),
            next_page_token: Some("next".to_string()),
            ..Default::default()
        };

        let refs = refs_from_response(response);
        let ids: Vec<&str> = refs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a3", "a5"]);
        assert_eq!(refs[1].thread_id, "t3");
    }

    #[test]
    fn test_refs_from_response_without_messages() {
        let response = api::ListMessagesResponse::default();
        assert!(refs_from_response(response).is_empty());
    }

    #[test]
    fn test_remap_not_found_names_requested_id() {
        let error = remap_not_found(
            GmailError::MessageNotFound("Resource not found".to_string()),
            "a2",
        );
        assert!(matches!(error, GmailError::MessageNotFound(ref id) if id == "a2"));
        assert_eq!(format!("{}", error), "Message not found: a2");
    }

    #[test]
    fn test_remap_not_found_keeps_other_errors() {
        let error = remap_not_found(GmailError::Forbidden("HTTP 403: Forbidden".to_string()), "a2");
        assert!(matches!(error, GmailError::Forbidden(ref m) if m == "HTTP 403: Forbidden"));
    }

    #[tokio::test]
    async fn test_fetch_message_propagates_error() {
        let client = client_with(1);
        let result = fetch_message(&client, "me", "m0").await;
        assert!(matches!(result, Err(GmailError::MessageNotFound(id)) if id == "m0"));
    }
}
