// control4-api: Async Rust client for the Control4 cloud account and local Director APIs

pub mod account;
pub mod config;
pub mod devices;
pub mod director;
pub mod error;
pub mod response;
pub mod transport;
pub mod websocket;

pub use account::AccountClient;
pub use account::models::{AccountController, BearerToken, ControllerInfo, DirectorToken, Link};
pub use config::{APPLICATION_KEY, AccountConfig, ClientInfo, CloudEndpoints};
pub use devices::{
    ArmState, Blind, Climate, ColorMode, ContactSensor, Fan, ItemHandle, Light, Lock, Relay,
    Room, SecurityPanel,
};
pub use director::{DirectorClient, Item, ItemVariable};
pub use error::Error;
pub use response::check_response_for_error;
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{DirectorEvent, DirectorEventStream, ItemUpdate, ItemUpdates, ReconnectConfig};
