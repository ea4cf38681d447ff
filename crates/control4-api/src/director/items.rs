// Director item endpoints
//
// Item listings, per-item metadata, and item commands. Every method is a
// single request against the local REST surface.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::director::client::DirectorClient;
use crate::director::models::Item;
use crate::error::Error;
use crate::response::{OneOrMany, decode};

impl DirectorClient {
    // ── Listings ─────────────────────────────────────────────────────

    /// List every item on the Director.
    ///
    /// `GET /api/v1/items`. A controller with no items yields an empty list.
    pub async fn all_items(&self) -> Result<Vec<Item>, Error> {
        let body = self.send_get_request("/api/v1/items").await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<Item> = decode(&body)?;
        debug!(count = items.len(), "fetched items");
        Ok(items)
    }

    /// List the items in a category (e.g. `lights`, `comfort`, `motorization`).
    ///
    /// `GET /api/v1/categories/{category}`. An unknown category fails with
    /// [`Error::InvalidCategory`].
    pub async fn items_by_category(&self, category: &str) -> Result<Vec<Item>, Error> {
        self.get_json(&format!("/api/v1/categories/{category}"))
            .await
    }

    // ── Single item ──────────────────────────────────────────────────

    /// Fetch the metadata of one item.
    ///
    /// `GET /api/v1/items/{id}`. The Director answers with a one-element
    /// list on most firmware; an empty answer is reported as not found.
    pub async fn item_info(&self, item_id: u32) -> Result<Item, Error> {
        let reply: OneOrMany<Item> = self.get_json(&format!("/api/v1/items/{item_id}")).await?;
        reply
            .into_vec()
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                message: format!("item {item_id} not found"),
            })
    }

    /// Fetch the driver setup of an item (`GET_SETUP`, sent synchronously).
    pub async fn item_setup(&self, item_id: u32) -> Result<Value, Error> {
        let body = self
            .send_post_request(
                &format!("/api/v1/items/{item_id}/commands"),
                "GET_SETUP",
                &Map::new(),
                false,
            )
            .await?;
        decode(&body)
    }

    /// The commands an item accepts. `GET /api/v1/items/{id}/commands`.
    pub async fn item_commands(&self, item_id: u32) -> Result<Value, Error> {
        self.get_json(&format!("/api/v1/items/{item_id}/commands"))
            .await
    }

    /// Network settings of an item. `GET /api/v1/items/{id}/network`.
    pub async fn item_network(&self, item_id: u32) -> Result<Value, Error> {
        self.get_json(&format!("/api/v1/items/{item_id}/network"))
            .await
    }

    /// Connection bindings of an item. `GET /api/v1/items/{id}/bindings`.
    pub async fn item_bindings(&self, item_id: u32) -> Result<Value, Error> {
        self.get_json(&format!("/api/v1/items/{item_id}/bindings"))
            .await
    }

    /// The navigator UI configuration. `GET /api/v1/agents/ui_configuration`.
    pub async fn ui_configuration(&self) -> Result<Value, Error> {
        self.get_json("/api/v1/agents/ui_configuration").await
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send a command to an item.
    ///
    /// `POST /api/v1/items/{id}/commands` with `async = true`. The parameter
    /// shape depends on the device type. If the Director rejects the item id
    /// or the command, the call fails with [`Error::Device`]; authentication
    /// and transport failures keep their own variants.
    ///
    /// Returns the Director's reply: parsed JSON, `Null` for an empty body,
    /// or the raw text when the reply is not JSON.
    pub async fn send_command<P: Serialize + Sync>(
        &self,
        item_id: u32,
        command: &str,
        params: &P,
    ) -> Result<Value, Error> {
        let body = self
            .send_post_request(
                &format!("/api/v1/items/{item_id}/commands"),
                command,
                params,
                true,
            )
            .await
            .map_err(|e| reject_as_device_error(item_id, command, e))?;

        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_str(trimmed) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(body)),
        }
    }
}

/// Rewrite controller-side rejections of a command as a device error.
fn reject_as_device_error(item_id: u32, command: &str, err: Error) -> Error {
    match err {
        Error::NotFound { message }
        | Error::InvalidCategory { message }
        | Error::Controller { message } => {
            warn!(item_id, command, "command rejected by director");
            Error::Device { item_id, message }
        }
        other => other,
    }
}
