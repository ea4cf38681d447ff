// Account client configuration
//
// Everything here has a vendor default, so `AccountConfig::default()` talks
// to the production Control4 cloud. Structs derive serde so an embedding
// application can load overrides from whatever config source it already uses.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::transport::TransportConfig;

pub(crate) const AUTHENTICATION_ENDPOINT: &str = "https://apis.control4.com/authentication/v1/rest";
pub(crate) const CONTROLLER_AUTHORIZATION_ENDPOINT: &str =
    "https://apis.control4.com/authentication/v1/rest/authorization";
pub(crate) const GET_CONTROLLERS_ENDPOINT: &str = "https://apis.control4.com/account/v3/rest/accounts";

/// Application key the Control4 identity endpoint expects from mobile clients.
pub const APPLICATION_KEY: &str = "78f6791373d61bea49fdb9fb8897f1f3af193f11";

/// Cloud endpoint URLs used by [`AccountClient`](crate::AccountClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CloudEndpoints {
    /// Login endpoint issuing the account bearer token.
    pub authentication: Url,
    /// Token exchange endpoint issuing director tokens.
    pub controller_authorization: Url,
    /// Account listing endpoint.
    pub accounts: Url,
}

impl CloudEndpoints {
    /// Point every endpoint at `base`, keeping the vendor paths.
    ///
    /// Handy for pointing the client at a mock server or a proxy.
    pub fn with_base(base: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            authentication: base.join("/authentication/v1/rest")?,
            controller_authorization: base.join("/authentication/v1/rest/authorization")?,
            accounts: base.join("/account/v3/rest/accounts")?,
        })
    }
}

impl Default for CloudEndpoints {
    // Parses compile-time constants.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            authentication: Url::parse(AUTHENTICATION_ENDPOINT).expect("valid endpoint"),
            controller_authorization: Url::parse(CONTROLLER_AUTHORIZATION_ENDPOINT)
                .expect("valid endpoint"),
            accounts: Url::parse(GET_CONTROLLERS_ENDPOINT).expect("valid endpoint"),
        }
    }
}

/// Device description sent with every login request.
///
/// The identity endpoint records this per session; the values have no
/// effect on what the account may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub device_name: String,
    #[serde(rename = "deviceUUID")]
    pub device_uuid: String,
    pub make: String,
    pub model: String,
    pub os: String,
    pub os_version: String,
    /// Application key; must be one the identity endpoint recognizes.
    #[serde(skip_serializing, default = "default_application_key")]
    pub application_key: String,
}

fn default_application_key() -> String {
    APPLICATION_KEY.into()
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            device_name: "control4-api".into(),
            device_uuid: "0000000000000000".into(),
            make: "control4-api".into(),
            model: "control4-api".into(),
            os: "Android".into(),
            os_version: "10".into(),
            application_key: default_application_key(),
        }
    }
}

/// Full configuration for an [`AccountClient`](crate::AccountClient).
#[derive(Debug, Clone, Default)]
pub struct AccountConfig {
    pub endpoints: CloudEndpoints,
    pub client_info: ClientInfo,
    pub transport: TransportConfig,
}
