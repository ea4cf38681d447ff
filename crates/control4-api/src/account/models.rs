// Cloud account API types
//
// Request bodies for the identity endpoints and the response shapes we read
// back. The cloud is inconsistent about optional fields, so responses use
// `#[serde(default)]` and keep unknown fields in `extra`.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::config::ClientInfo;
use crate::response::OneOrMany;

// ── Requests ────────────────────────────────────────────────────────

/// Body of `POST /authentication/v1/rest`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub client_info: LoginClientInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginClientInfo<'a> {
    pub device: &'a ClientInfo,
    pub user_info: UserInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserInfo<'a> {
    pub application_key: &'a str,
    pub password: &'a str,
    pub user_name: &'a str,
}

/// Body of `POST /authentication/v1/rest/authorization`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceAuthorizationRequest<'a> {
    pub service_info: ServiceInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceInfo<'a> {
    pub common_name: &'a str,
    pub services: &'static str,
}

// ── Token responses ─────────────────────────────────────────────────

/// `{"authToken": {"token": "...", "validSeconds": 86400}}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthTokenResponse {
    #[serde(default)]
    pub auth_token: Option<RawAuthToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAuthToken {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub valid_seconds: Option<u64>,
}

/// Account bearer token for the Control4 cloud API.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub token: SecretString,
    /// Lifetime reported by the identity endpoint, when present.
    pub valid_seconds: Option<u64>,
}

/// Director bearer token scoped to a single controller.
///
/// Usually valid for 86400 seconds. Expiry is not tracked here; the
/// Director answers with an auth error once it lapses.
#[derive(Debug, Clone)]
pub struct DirectorToken {
    pub token: SecretString,
    pub valid_seconds: u64,
}

// ── Controllers ─────────────────────────────────────────────────────

/// Wrapper around the accounts listing; the cloud returns either one
/// account object or a list of them under `account`.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountListing {
    pub account: OneOrMany<AccountController>,
}

/// A controller registered to the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountController {
    /// e.g. `control4_MODEL_MACADDRESS`; used for the director token exchange.
    pub controller_common_name: String,
    /// Cloud API link to the account record (see `controller_info`).
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `{"href": "..."}` link object used throughout the account API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Detailed account record for a controller (`GET {href}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub controller_common_name: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub has_logged_in: Option<bool>,
    #[serde(default)]
    pub allows_patching: Option<bool>,
    #[serde(default)]
    pub allows_support: Option<bool>,
    #[serde(default)]
    pub block_notifications: Option<bool>,
    /// ISO-8601 timestamps as reported by the cloud.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub last_check_in: Option<String>,
    #[serde(default)]
    pub provision_date: Option<String>,
    #[serde(default)]
    pub controller: Option<Link>,
    #[serde(default)]
    pub dealer: Option<Link>,
    #[serde(default)]
    pub licenses: Option<Link>,
    #[serde(default)]
    pub storage: Option<Link>,
    #[serde(default)]
    pub users: Option<Link>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `GET {href}/controller` -- only the fields we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ControllerDetails {
    pub os_version: String,
}
