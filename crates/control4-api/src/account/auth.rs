// Account login and director token exchange
//
// Login trades the account username/password for a bearer token, which is
// kept on the client. The token exchange trades that bearer token for a
// director token scoped to one controller common name.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::account::client::AccountClient;
use crate::account::models::{
    AuthTokenResponse, BearerToken, DirectorToken, LoginClientInfo, LoginRequest,
    ServiceAuthorizationRequest, ServiceInfo, UserInfo,
};
use crate::error::Error;
use crate::response::{decode, read_body};

impl AccountClient {
    /// Log in to the Control4 cloud and store the account bearer token.
    ///
    /// `POST /authentication/v1/rest`. Rejected credentials, an unreachable
    /// identity endpoint, or a reply without a token all fail with an
    /// authentication error, and any previously stored token is left as is.
    pub async fn authenticate(&self) -> Result<BearerToken, Error> {
        let url = self.endpoints().authentication.clone();
        debug!("logging in at {}", url);

        let body = LoginRequest {
            client_info: LoginClientInfo {
                device: self.client_info(),
                user_info: UserInfo {
                    application_key: &self.client_info().application_key,
                    password: self.password().expose_secret(),
                    user_name: self.username(),
                },
            },
        };

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("identity endpoint unreachable: {e}"),
            })?;

        let body = read_body(resp).await.map_err(|e| match e {
            Error::Transport(e) => Error::Authentication {
                message: format!("identity endpoint unreachable: {e}"),
            },
            other => other,
        })?;
        let reply: AuthTokenResponse = decode(&body)?;

        let Some((token, valid_seconds)) = reply
            .auth_token
            .and_then(|t| t.token.filter(|s| !s.is_empty()).map(|s| (s, t.valid_seconds)))
        else {
            warn!("login reply carried no account bearer token");
            return Err(Error::Authentication {
                message: "did not receive an account bearer token -- is the username/password correct?"
                    .into(),
            });
        };

        let bearer = BearerToken {
            token: SecretString::from(token),
            valid_seconds,
        };
        self.store_bearer(bearer.clone());
        debug!("login successful");
        Ok(bearer)
    }

    /// Exchange the account bearer token for a director token.
    ///
    /// `POST /authentication/v1/rest/authorization` with
    /// `{"serviceInfo": {"commonName": ..., "services": "director"}}`.
    /// Fails with [`Error::MissingToken`] before [`authenticate`](Self::authenticate).
    pub async fn director_token(&self, controller_common_name: &str) -> Result<DirectorToken, Error> {
        let url = self.endpoints().controller_authorization.clone();
        debug!(controller_common_name, "requesting director token");

        let body = ServiceAuthorizationRequest {
            service_info: ServiceInfo {
                common_name: controller_common_name,
                services: "director",
            },
        };

        let reply: AuthTokenResponse = self.post(url, &body).await?;
        let raw = reply.auth_token.ok_or_else(|| Error::NotFound {
            message: format!("no director token issued for {controller_common_name}"),
        })?;

        match raw.token.filter(|s| !s.is_empty()) {
            Some(token) => Ok(DirectorToken {
                token: SecretString::from(token),
                valid_seconds: raw.valid_seconds.unwrap_or(DEFAULT_DIRECTOR_TOKEN_SECONDS),
            }),
            None => Err(Error::NotFound {
                message: format!("no director token issued for {controller_common_name}"),
            }),
        }
    }
}

/// Lifetime the cloud uses for director tokens when it omits `validSeconds`.
const DEFAULT_DIRECTOR_TOKEN_SECONDS: u64 = 86_400;
