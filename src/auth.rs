//! OAuth2 credential acquisition for the Gmail API

use chrono::{DateTime, Utc};
use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use std::env;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use yup_oauth2::ApplicationSecret;

use crate::config::AuthConfig;
use crate::error::{GmailError, Result};

/// Read-only scope; the only access this tool asks for
pub const READONLY_SCOPES: &[&str] = &["https://www.googleapis.com/auth/gmail.readonly"];

/// HTTPS connector shared by the authenticator and the API hub
pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;

/// Type alias for Gmail Hub to simplify type signatures
pub type GmailHub = Gmail<HttpsConnector>;

/// Authenticator produced by the installed-app flow
pub type TokenAuthenticator = yup_oauth2::authenticator::Authenticator<HttpsConnector>;

/// A usable OAuth2 credential
///
/// Wraps the authenticator so later API calls can refresh the access token
/// from the cache without user interaction.
pub struct Credential {
    authenticator: TokenAuthenticator,
    expires_at: Option<DateTime<Utc>>,
    had_cached_token: bool,
}

impl Credential {
    /// Expiry of the access token obtained during authorization
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// True when a token file existed before this run
    ///
    /// Does not say whether that token was usable: an expired token whose
    /// refresh failed still falls back to the interactive flow.
    pub fn had_cached_token(&self) -> bool {
        self.had_cached_token
    }

    pub fn into_authenticator(self) -> TokenAuthenticator {
        self.authenticator
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("expires_at", &self.expires_at)
            .field("had_cached_token", &self.had_cached_token)
            .finish_non_exhaustive()
    }
}

/// Obtain a credential, reusing the token cache when possible
///
/// Falls back to the installed-app flow: a callback listener is opened on
/// `redirect_port`, the user is directed to the consent page, and the
/// resulting token is written to the cache. The whole token request is
/// bounded by `authorization_timeout_secs`.
pub async fn obtain_credential(config: &AuthConfig) -> Result<Credential> {
    let secret = load_application_secret(config).await?;

    tokio::fs::create_dir_all(&config.token_dir).await.map_err(|e| {
        GmailError::AuthError(format!(
            "Failed to create token directory {:?}: {}",
            config.token_dir, e
        ))
    })?;

    let token_path = config.token_cache_path();
    let had_cached_token = token_path.exists();
    if had_cached_token {
        debug!("Found cached token at {:?}", token_path);
    } else {
        info!(
            "No cached token for '{}', starting interactive authorization on port {}",
            config.user_label, config.redirect_port
        );
    }

    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPPortRedirect(config.redirect_port),
    )
    .persist_tokens_to_disk(&token_path)
    .build()
    .await
    .map_err(|e| GmailError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    // Fetch a token now with the configured scopes so it is cached before any API call
    let timeout = Duration::from_secs(config.authorization_timeout_secs);
    let token = with_authorization_timeout(timeout, auth.token(config.scopes.as_slice()))
        .await?
        .map_err(|e| GmailError::AuthError(format!("Failed to obtain token: {}", e)))?;

    let expires_at = token
        .expiration_time()
        .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), 0));

    if token_path.exists() {
        secure_token_file(&token_path).await?;
    }

    info!("Authorized Gmail access for '{}'", config.user_label);
    Ok(Credential {
        authenticator: auth,
        expires_at,
        had_cached_token,
    })
}

/// Load the OAuth2 client secret from the configured source
///
/// A missing or unparseable descriptor is reported as `SecretsNotFound`.
pub async fn load_application_secret(config: &AuthConfig) -> Result<ApplicationSecret> {
    if config.credentials_from_env {
        return load_credentials_from_env();
    }
    load_secret_file(&config.credentials_path).await
}

/// Read an "installed" or "web" client secret JSON file
pub async fn load_secret_file(path: &Path) -> Result<ApplicationSecret> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        GmailError::SecretsNotFound(format!("{}: {}", path.display(), e))
    })?;

    yup_oauth2::parse_application_secret(&content).map_err(|e| {
        GmailError::SecretsNotFound(format!(
            "{} is not a valid OAuth client secret: {}",
            path.display(),
            e
        ))
    })
}

/// Load OAuth2 credentials from environment variables
///
/// # Environment Variables
/// - `GMAIL_CLIENT_ID`: OAuth2 client ID
/// - `GMAIL_CLIENT_SECRET`: OAuth2 client secret
/// - `GMAIL_REDIRECT_URI`: Redirect URI (optional, defaults to http://localhost)
pub fn load_credentials_from_env() -> Result<ApplicationSecret> {
    let client_id = env::var("GMAIL_CLIENT_ID")
        .map_err(|_| GmailError::SecretsNotFound("GMAIL_CLIENT_ID not set".to_string()))?;
    let client_secret = env::var("GMAIL_CLIENT_SECRET")
        .map_err(|_| GmailError::SecretsNotFound("GMAIL_CLIENT_SECRET not set".to_string()))?;
    let redirect_uri =
        env::var("GMAIL_REDIRECT_URI").unwrap_or_else(|_| "http://localhost".to_string());

    Ok(ApplicationSecret {
        client_id,
        client_secret,
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        redirect_uris: vec![redirect_uri],
        ..Default::default()
    })
}

/// Run an authorization future with an upper bound on its duration
///
/// Dropping the future on expiry releases the local callback listener.
pub async fn with_authorization_timeout<F, T>(timeout: Duration, flow: F) -> Result<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(timeout, flow)
        .await
        .map_err(|_| GmailError::AuthTimeout {
            timeout_secs: timeout.as_secs(),
        })
}

/// Remove the cached token so the next run re-authorizes
///
/// Returns whether a cached token existed.
pub async fn clear_token_cache(config: &AuthConfig) -> Result<bool> {
    let token_path = config.token_cache_path();
    match tokio::fs::remove_file(&token_path).await {
        Ok(()) => {
            info!("Removed cached token {:?}", token_path);
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Restrict the token cache file to its owner (mode 0600)
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Windows relies on the ACLs inherited from the token directory
#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}
