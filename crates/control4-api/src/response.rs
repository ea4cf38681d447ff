// Vendor error classification
//
// Control4 reports failures in at least five shapes, frequently with HTTP
// 200: a `C4ErrorResponse` object (JSON or XML), a flat `{code, message}`
// object, the Director's `{error, details}` object, an older
// `{status_code}` object, and a `<c4soap>` XML envelope. Every response
// body from the cloud and the Director passes through
// `check_response_for_error` before it is parsed.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, trace};

use crate::error::Error;

const BAD_CREDENTIALS_DETAILS: &str = "Bad credentials";
const BAD_TOKEN_DETAILS: &str = "Expired or invalid token";

/// Inspect a raw response body for a Control4 error payload.
///
/// Returns `Ok(())` when the body carries no recognizable error. The raw
/// body is kept on the returned error so callers can log it.
pub fn check_response_for_error(text: &str) -> Result<(), Error> {
    if text.contains("Cannot GET") {
        return Err(Error::NotFound {
            message: text.to_owned(),
        });
    }

    let result = match serde_json::from_str::<Value>(text) {
        Ok(value) => check_json(&value, text),
        Err(_) => check_xml(text),
    };

    if let Err(ref e) = result {
        debug!(error = %e, "Control4 error response");
    }
    result
}

/// Read a response body and classify it.
///
/// Vendor error payloads win over the HTTP status; a bare non-2xx status
/// with an unrecognized body is mapped by status code.
pub(crate) async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(%status, body_len = body.len(), "response received");

    check_response_for_error(&body)?;

    if status.is_success() {
        return Ok(body);
    }

    let message = format!("HTTP {status}: {}", preview(&body));
    Err(match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            Error::Authentication { message }
        }
        reqwest::StatusCode::NOT_FOUND => Error::NotFound { message },
        _ => Error::Controller { message },
    })
}

/// Deserialize a classified body, keeping it on failure for debugging.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// First 200 bytes of a body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// The vendor APIs return either a single object or a list of them for
/// the same endpoint depending on firmware.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

fn check_json(value: &Value, text: &str) -> Result<(), Error> {
    let Some(obj) = value.as_object() else {
        return Ok(());
    };

    if let Some(inner) = obj.get("C4ErrorResponse").and_then(Value::as_object) {
        return Err(classify_code(
            inner.get("code").and_then(Value::as_i64),
            inner.get("details").and_then(Value::as_str).unwrap_or(""),
            text,
        ));
    }

    let code = obj.get("code").and_then(Value::as_i64);
    if code.is_some() && (obj.contains_key("message") || obj.contains_key("details")) {
        return Err(classify_code(
            code,
            obj.get("details").and_then(Value::as_str).unwrap_or(""),
            text,
        ));
    }

    if let Some(err) = obj.get("error") {
        let error_text = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(classify_director_error(
            &error_text,
            obj.get("details").and_then(Value::as_str).unwrap_or(""),
            text,
        ));
    }

    if obj.get("status_code").and_then(Value::as_i64) == Some(404) {
        return Err(Error::NotFound {
            message: text.to_owned(),
        });
    }

    Ok(())
}

/// Map a numeric vendor error code. Matching details win over the code.
fn classify_code(code: Option<i64>, details: &str, text: &str) -> Error {
    let message = text.to_owned();
    if details.contains(BAD_CREDENTIALS_DETAILS) {
        return Error::BadCredentials { message };
    }
    match code {
        Some(401) => Error::Authentication { message },
        Some(404) => Error::NotFound { message },
        _ => Error::Controller { message },
    }
}

fn classify_director_error(error: &str, details: &str, text: &str) -> Error {
    let message = text.to_owned();
    if details.contains(BAD_TOKEN_DETAILS) {
        Error::BadToken { message }
    } else if error == "Unauthorized" {
        Error::Authentication { message }
    } else if error.contains("Invalid category") {
        Error::InvalidCategory { message }
    } else {
        Error::Controller { message }
    }
}

// ── XML ──────────────────────────────────────────────────────────────

/// Root elements that carry vendor error information.
const VENDOR_XML_ROOTS: [&str; 2] = ["C4ErrorResponse", "c4soap"];

/// A vendor XML document: the root element and the text of its direct
/// children, keyed by tag name.
#[derive(Debug, Default)]
struct VendorXml {
    root: String,
    fields: HashMap<String, String>,
}

impl VendorXml {
    fn field(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }
}

fn check_xml(text: &str) -> Result<(), Error> {
    let doc = match parse_vendor_xml(text) {
        Ok(Some(doc)) => doc,
        // Plain text, HTML error pages, and other XML are left to the
        // HTTP status mapping.
        Ok(None) => return Ok(()),
        Err(reason) => {
            error!(
                body = text,
                %reason,
                "failed to parse XML response from Director (mismatched tag or corruption)"
            );
            return Err(Error::Deserialization {
                message: format!("malformed XML response: {reason}"),
                body: text.to_owned(),
            });
        }
    };

    match doc.root.as_str() {
        "C4ErrorResponse" => Err(classify_code(
            doc.field("code").and_then(|c| c.trim().parse().ok()),
            doc.field("details").unwrap_or(""),
            text,
        )),
        _ => match doc.field("error") {
            Some(code) if code.trim() == "401" => Err(Error::Authentication {
                message: text.to_owned(),
            }),
            Some(_) => Err(Error::Controller {
                message: doc
                    .field("error_string")
                    .map_or_else(|| text.to_owned(), str::to_owned),
            }),
            None => Ok(()),
        },
    }
}

/// Parse `text` if its root element is a vendor error document.
///
/// `Ok(None)` when the body is not XML or the root is something else.
/// `Err` only for a vendor document that is truncated or ill-formed.
fn parse_vendor_xml(text: &str) -> Result<Option<VendorXml>, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut doc: Option<VendorXml> = None;
    let mut open: Vec<String> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) if doc.is_some() => return Err(e.to_string()),
            Err(_) => return Ok(None),
        };

        match event {
            Event::Start(tag) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                if open.is_empty() {
                    if !VENDOR_XML_ROOTS.contains(&name.as_str()) {
                        return Ok(None);
                    }
                    doc = Some(VendorXml {
                        root: name.clone(),
                        ..VendorXml::default()
                    });
                }
                open.push(name);
            }
            Event::Empty(tag) => {
                let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                match doc.as_mut() {
                    None => {
                        let is_vendor = VENDOR_XML_ROOTS.contains(&name.as_str());
                        return Ok(is_vendor.then(|| VendorXml {
                            root: name,
                            ..VendorXml::default()
                        }));
                    }
                    Some(doc) if open.len() == 1 => {
                        doc.fields.entry(name).or_default();
                    }
                    Some(_) => {}
                }
            }
            Event::Text(content) => {
                if let (Some(doc), Some(tag), 2) = (doc.as_mut(), open.last(), open.len()) {
                    let value = content.unescape().map_err(|e| e.to_string())?;
                    doc.fields.entry(tag.clone()).or_default().push_str(&value);
                }
            }
            Event::End(_) => {
                open.pop();
                if open.is_empty() && doc.is_some() {
                    return Ok(doc);
                }
            }
            Event::Eof => {
                return match doc {
                    Some(_) => Err("document ends before the root element is closed".into()),
                    None => Ok(None),
                };
            }
            _ => {}
        }
    }
}
