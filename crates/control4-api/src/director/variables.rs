// Director variable endpoints
//
// Variables are the Director's view of device state. Values arrive as JSON
// scalars; the literal string "Undefined" means the driver has not reported
// a value yet and is normalized to `null` / `None`.

use serde_json::Value;
use tracing::debug;

use crate::director::client::DirectorClient;
use crate::director::models::{ItemVariable, normalize_value};
use crate::error::Error;
use crate::response::{decode, preview};

impl DirectorClient {
    /// Every variable of one item. `GET /api/v1/items/{id}/variables`.
    pub async fn item_variables(&self, item_id: u32) -> Result<Vec<ItemVariable>, Error> {
        let vars: Vec<ItemVariable> = self
            .get_json(&format!("/api/v1/items/{item_id}/variables"))
            .await?;
        Ok(vars.into_iter().map(ItemVariable::normalize).collect())
    }

    /// The value of the first matching variable of one item.
    ///
    /// `GET /api/v1/items/{id}/variables?varnames=A,B`. Passing several
    /// names returns whichever the Director lists first; use this when a
    /// variable was renamed between driver versions. `Ok(None)` means the
    /// variable exists but is `"Undefined"`.
    pub async fn item_variable_value(
        &self,
        item_id: u32,
        names: &[&str],
    ) -> Result<Option<Value>, Error> {
        let varnames = names.join(",");
        let body = self
            .send_get_request(&format!(
                "/api/v1/items/{item_id}/variables?varnames={varnames}"
            ))
            .await?;

        let vars = variable_list(&body, Some(item_id), &varnames)?;
        let first = vars.into_iter().next().ok_or_else(|| Error::VariableNotFound {
            item_id: Some(item_id),
            names: varnames.clone(),
        })?;

        debug!(item_id, var = %first.var_name, "variable read");
        Ok(defined(first.value))
    }

    /// The named variables across every item that has them.
    ///
    /// `GET /api/v1/items/variables?varnames=A,B`. Fails with
    /// [`Error::VariableNotFound`] when no item reports any of the names.
    pub async fn all_item_variable_values(
        &self,
        names: &[&str],
    ) -> Result<Vec<ItemVariable>, Error> {
        let varnames = names.join(",");
        let body = self
            .send_get_request(&format!("/api/v1/items/variables?varnames={varnames}"))
            .await?;

        let vars = variable_list(&body, None, &varnames)?;
        if vars.is_empty() {
            return Err(Error::VariableNotFound {
                item_id: None,
                names: varnames,
            });
        }
        Ok(vars.into_iter().map(ItemVariable::normalize).collect())
    }
}

/// Parse a variable listing, rejecting anything that is not a JSON list.
fn variable_list(
    body: &str,
    item_id: Option<u32>,
    varnames: &str,
) -> Result<Vec<ItemVariable>, Error> {
    let value: Value = decode(body)?;
    if !value.is_array() {
        return Err(Error::Deserialization {
            message: format!(
                "expected a variable list for {varnames}{}, got: {}",
                item_id.map_or_else(String::new, |id| format!(" on item {id}")),
                preview(body)
            ),
            body: body.to_owned(),
        });
    }
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

/// A variable value with `"Undefined"` and `null` mapped to `None`.
pub(crate) fn defined(value: Value) -> Option<Value> {
    match normalize_value(value) {
        Value::Null => None,
        value => Some(value),
    }
}
