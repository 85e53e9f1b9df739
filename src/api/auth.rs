//! Service-account authentication for the Google Sheets API.
//!
//! The service account signs a JWT with its private key and exchanges it for an access token.
//! `yup-oauth2` does the exchange and keeps the token cached, refreshing it when it is within a
//! minute of expiring.

use crate::api::OAUTH_SCOPES;
use crate::error::Res;
use crate::Config;
use anyhow::Context;
use serde_json::json;
use tracing::debug;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::ServiceAccountAuthenticator;

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Provides access tokens for the service account named in the `Config`.
pub(crate) struct TokenProvider {
    auth: DefaultAuthenticator,
}

impl TokenProvider {
    /// Creates the authenticator. This does not contact Google; the first call to `token` does.
    pub(crate) async fn new(config: &Config) -> Res<Self> {
        let account = config
            .service_account()
            .context("Service account credentials are required to use Google Sheets")?;

        let key = json!({
            "type": "service_account",
            "client_email": account.email(),
            "private_key": account.private_key(),
            "token_uri": TOKEN_URI,
        });
        let key = yup_oauth2::parse_service_account_key(key.to_string())
            .context("The service account credentials are malformed")?;

        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .context("Failed to create the service account authenticator")?;

        debug!("Created authenticator for {}", account.email());
        Ok(Self { auth })
    }

    /// Returns a valid access token, fetching a new one if the cached one is expired.
    pub(crate) async fn token(&self) -> Res<String> {
        let token = self
            .auth
            .token(OAUTH_SCOPES)
            .await
            .context("Failed to get an access token for the service account")?;
        let token = token
            .token()
            .context("Google returned an empty access token")?
            .to_string();
        Ok(token)
    }
}
