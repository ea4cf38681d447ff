pub mod client;
pub mod items;
pub mod models;
pub mod variables;

pub use client::DirectorClient;
pub use models::{Item, ItemVariable};
