// Director HTTP client
//
// Wraps `reqwest::Client` with the Director base URL, the director bearer
// token, and vendor error classification. Item and variable endpoints are
// implemented as inherent methods in sibling files.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::director::models::CommandRequest;
use crate::error::Error;
use crate::response::{decode, read_body};
use crate::transport::TransportConfig;

/// Client for one Control4 Director's local REST API.
///
/// Holds only static connection parameters: the controller base URL and
/// the director bearer token. Every call is an independent request; the
/// client imposes no ordering between concurrent calls.
#[derive(Clone)]
pub struct DirectorClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl std::fmt::Debug for DirectorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DirectorClient {
    /// Create a client for the Director at `address` (IP or host name).
    ///
    /// Connects over HTTPS and accepts the Director's self-signed
    /// certificate. No network call.
    pub fn new(address: &str, token: SecretString) -> Result<Self, Error> {
        Self::with_transport(address, token, &TransportConfig::director())
    }

    /// Create a client with explicit TLS / timeout settings. No network call.
    pub fn with_transport(
        address: &str,
        token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("https://{address}"))?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and base URL.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: SecretString) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// The Director base URL (`https://{address}`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn token(&self) -> &SecretString {
        &self.token
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    // ── Raw requests ─────────────────────────────────────────────────

    /// Send a GET request to an API path (e.g. `/api/v1/items`).
    ///
    /// Returns the raw response body after vendor error checks.
    pub async fn send_get_request(&self, path: &str) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .send()
            .await
            .map_err(Error::Transport)?;

        read_body(resp).await
    }

    /// Send a command to an API path.
    ///
    /// The body is `{"async": is_async, "command": command, "tParams": params}`.
    /// Returns the raw response body after vendor error checks.
    pub async fn send_post_request<P: Serialize + Sync>(
        &self,
        path: &str,
        command: &str,
        params: &P,
        is_async: bool,
    ) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!(command, "POST {}", url);

        let body = CommandRequest {
            is_async,
            command,
            params,
        };

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        read_body(resp).await
    }

    /// GET an API path and deserialize the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        decode(&self.send_get_request(path).await?)
    }
}
