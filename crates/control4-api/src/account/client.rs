// Cloud account HTTP client
//
// Wraps `reqwest::Client` with the Control4 cloud endpoints, the stored
// account bearer token, and vendor error classification. Endpoint groups
// (login / token exchange, controller lookups) live in sibling files as
// inherent methods to keep this module focused on transport mechanics.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::account::models::BearerToken;
use crate::config::{AccountConfig, ClientInfo, CloudEndpoints};
use crate::error::Error;
use crate::response::{decode, read_body};

/// Client for the Control4 cloud account API.
///
/// Holds the account credentials and, after [`authenticate`](Self::authenticate)
/// succeeds, the account bearer token. Every other call attaches that token
/// as `Authorization: Bearer ...`. Each method performs exactly one request;
/// nothing is retried or cached apart from the token itself.
pub struct AccountClient {
    http: reqwest::Client,
    endpoints: CloudEndpoints,
    client_info: ClientInfo,
    username: String,
    password: SecretString,
    bearer: ArcSwapOption<BearerToken>,
}

impl AccountClient {
    /// Create a client for the production Control4 cloud. No network call.
    pub fn new(username: impl Into<String>, password: SecretString) -> Result<Self, Error> {
        Self::with_config(username, password, AccountConfig::default())
    }

    /// Create a client from an explicit [`AccountConfig`]. No network call.
    pub fn with_config(
        username: impl Into<String>,
        password: SecretString,
        config: AccountConfig,
    ) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self {
            http,
            endpoints: config.endpoints,
            client_info: config.client_info,
            username: username.into(),
            password,
            bearer: ArcSwapOption::empty(),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// Use this to share a connection pool with the rest of an application,
    /// or to point the client at a mock server. The login device identity
    /// defaults to [`ClientInfo::default`]; see
    /// [`with_client_info`](Self::with_client_info).
    pub fn with_client(
        http: reqwest::Client,
        username: impl Into<String>,
        password: SecretString,
        endpoints: CloudEndpoints,
    ) -> Self {
        Self {
            http,
            endpoints,
            client_info: ClientInfo::default(),
            username: username.into(),
            password,
            bearer: ArcSwapOption::empty(),
        }
    }

    /// Replace the device identity sent with the login request.
    ///
    /// [`with_config`](Self::with_config) takes it from
    /// [`AccountConfig::client_info`]; this covers clients built with
    /// [`with_client`](Self::with_client).
    pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = client_info;
        self
    }

    /// The account username (e-mail).
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The configured cloud endpoints.
    pub fn endpoints(&self) -> &CloudEndpoints {
        &self.endpoints
    }

    /// The bearer token stored by the last successful login, if any.
    pub fn bearer_token(&self) -> Option<Arc<BearerToken>> {
        self.bearer.load_full()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn client_info(&self) -> &ClientInfo {
        &self.client_info
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    pub(crate) fn store_bearer(&self, token: BearerToken) {
        debug!("storing account bearer token");
        self.bearer.store(Some(Arc::new(token)));
    }

    /// `Authorization` header value, or `MissingToken` before login.
    fn authorization(&self) -> Result<String, Error> {
        let guard = self.bearer.load();
        let token = guard.as_ref().ok_or(Error::MissingToken)?;
        Ok(format!("Bearer {}", token.token.expose_secret()))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and deserialize the body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let auth = self.authorization()?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(Error::Transport)?;

        decode(&read_body(resp).await?)
    }

    /// Send an authenticated POST with a JSON body and deserialize the reply.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let auth = self.authorization()?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        decode(&read_body(resp).await?)
    }
}
