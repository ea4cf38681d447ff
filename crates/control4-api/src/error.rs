use thiserror::Error;

/// Top-level error type for the `control4-api` crate.
///
/// Covers every failure mode across the cloud account API, the local
/// Director REST surface, and the Director item-update socket. Variants
/// that originate from a vendor error payload keep the raw response text
/// in `message` so callers can log exactly what the controller said.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Invalid or expired token, or the cloud rejected the request.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The Control4 account username or password was rejected.
    #[error("Bad account credentials: {message}")]
    BadCredentials { message: String },

    /// The Director rejected its bearer token as expired or invalid.
    #[error("Expired or invalid Director token: {message}")]
    BadToken { message: String },

    /// An account call was made before `authenticate()` succeeded.
    #[error("No account bearer token -- call authenticate() first")]
    MissingToken,

    // ── Lookup ──────────────────────────────────────────────────────
    /// Unknown endpoint, controller, or item.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The Director does not know the requested item category.
    #[error("Invalid category: {message}")]
    InvalidCategory { message: String },

    /// The Director returned no value for the requested variable(s).
    #[error(
        "Variable {names} not found{}",
        .item_id.map_or_else(String::new, |id| format!(" for item {id}"))
    )]
    VariableNotFound { item_id: Option<u32>, names: String },

    // ── Device ──────────────────────────────────────────────────────
    /// The Director rejected a command sent to an item.
    #[error("Item {item_id} rejected command: {message}")]
    Device { item_id: u32, message: String },

    /// Vendor error payload that matches no more specific variant.
    #[error("Control4 returned an error: {message}")]
    Controller { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── WebSocket ───────────────────────────────────────────────────
    /// Item-update socket could not be established or dropped mid-stream.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A color string could not be parsed.
    #[error("Invalid color {input:?}: {reason}")]
    InvalidColor { input: String, reason: &'static str },
}

impl Error {
    /// Returns `true` if re-running the authentication / token exchange
    /// sequence might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::BadCredentials { .. }
                | Self::BadToken { .. }
                | Self::MissingToken
        )
    }

    /// Returns `true` for unknown controllers, items, endpoints, or categories.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::InvalidCategory { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if the request never got a usable answer from the
    /// other side (network, TLS, or socket failure).
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::InvalidUrl(_) | Self::Tls(_) | Self::WebSocketConnect(_)
        )
    }

    /// Returns `true` if the Director refused a command for a specific item.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device { .. })
    }

    /// The raw vendor response text carried by classified errors, if any.
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Authentication { message }
            | Self::BadCredentials { message }
            | Self::BadToken { message }
            | Self::NotFound { message }
            | Self::InvalidCategory { message }
            | Self::Controller { message }
            | Self::Device { message, .. } => Some(message),
            Self::Deserialization { body, .. } => Some(body),
            _ => None,
        }
    }
}
