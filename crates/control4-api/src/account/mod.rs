// Control4 cloud account API
//
// Login, controller listing, and the bearer-to-director token exchange.

pub mod auth;
pub mod client;
pub mod controllers;
pub mod models;

pub use client::AccountClient;
