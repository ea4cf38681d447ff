#![allow(clippy::unwrap_used)]
// Integration tests for `DirectorClient` and the device wrappers using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use control4_api::{ArmState, DirectorClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("control4_api=debug")
        .try_init();
}

async fn setup() -> (MockServer, DirectorClient) {
    init_tracing();
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DirectorClient::with_client(
        reqwest::Client::new(),
        base_url,
        SecretString::from("director-jwt".to_string()),
    );
    (server, client)
}

fn commands_path(item_id: u32) -> String {
    format!("/api/v1/items/{item_id}/commands")
}

async fn mount_variable(server: &MockServer, item_id: u32, name: &str, value: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/items/{item_id}/variables")))
        .and(query_param("varnames", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": item_id, "varName": name, "value": value }
        ])))
        .mount(server)
        .await;
}

async fn mount_command_ok(server: &MockServer, item_id: u32) {
    Mock::given(method("POST"))
        .and(path(commands_path(item_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

// ── Item listing tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_all_items() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(header("authorization", "Bearer director-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Project", "type": 1 },
            { "id": 42, "name": "Pendants", "type": 7, "roomId": 12, "proxy": "light_v2",
              "categories": ["lights"] }
        ])))
        .mount(&server)
        .await;

    let items = client.all_items().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].id, 42);
    assert_eq!(items[1].room_id, Some(12));
    assert_eq!(items[1].proxy.as_deref(), Some("light_v2"));
}

#[tokio::test]
async fn test_all_items_empty_controller() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let items = assert_ok!(client.all_items().await);

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_items_by_unknown_category() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/categories/spaceships"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Invalid category",
            "details": "spaceships"
        })))
        .mount(&server)
        .await;

    let err = assert_err!(client.items_by_category("spaceships").await);

    assert!(matches!(err, Error::InvalidCategory { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_item_info_and_metadata() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 42, "name": "Pendants", "capabilities": { "dimmer": true } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/items/42/bindings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "bindingId": 5001 }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/agents/ui_configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "experiences": [] })))
        .mount(&server)
        .await;

    let item = client.item_info(42).await.unwrap();
    let bindings = client.item_bindings(42).await.unwrap();
    let ui = client.ui_configuration().await.unwrap();

    assert_eq!(item.name, "Pendants");
    assert_eq!(item.capability("dimmer"), Some(&json!(true)));
    assert_eq!(bindings[0]["bindingId"], 5001);
    assert_eq!(ui, json!({ "experiences": [] }));
}

#[tokio::test]
async fn test_item_info_unknown_item() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/9999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = assert_err!(client.item_info(9999).await);

    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_item_setup_is_synchronous() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(100)))
        .and(body_json(json!({ "async": false, "command": "GET_SETUP", "tParams": {} })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "setup": { "scale": "FAHRENHEIT" } })))
        .mount(&server)
        .await;

    let setup = client.item_setup(100).await.unwrap();

    assert_eq!(setup["setup"]["scale"], "FAHRENHEIT");
}

// ── Variable tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_variable_value_undefined_is_none() {
    let (server, client) = setup().await;
    mount_variable(&server, 100, "HUMIDITY", json!("Undefined")).await;
    mount_variable(&server, 100, "LIGHT_LEVEL", json!(0)).await;

    let humidity = client.item_variable_value(100, &["HUMIDITY"]).await.unwrap();
    let level = client.item_variable_value(100, &["LIGHT_LEVEL"]).await.unwrap();

    assert_eq!(humidity, None);
    assert_eq!(level, Some(json!(0)));
}

#[tokio::test]
async fn test_variable_names_joined_with_commas() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/7/variables"))
        .and(query_param("varnames", "Brightness Percent,LIGHT_LEVEL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "varName": "LIGHT_LEVEL", "value": 55 }
        ])))
        .mount(&server)
        .await;

    let value = client
        .item_variable_value(7, &["Brightness Percent", "LIGHT_LEVEL"])
        .await
        .unwrap();

    assert_eq!(value, Some(json!(55)));
}

#[tokio::test]
async fn test_variable_value_missing_or_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/7/variables"))
        .and(query_param("varnames", "NOPE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/items/7/variables"))
        .and(query_param("varnames", "ODD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 1 })))
        .mount(&server)
        .await;

    let missing = assert_err!(client.item_variable_value(7, &["NOPE"]).await);
    let malformed = assert_err!(client.item_variable_value(7, &["ODD"]).await);

    assert!(
        matches!(missing, Error::VariableNotFound { item_id: Some(7), .. }),
        "got: {missing:?}"
    );
    assert!(matches!(malformed, Error::Deserialization { .. }), "got: {malformed:?}");
}

#[tokio::test]
async fn test_all_item_variable_values() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/variables"))
        .and(query_param("varnames", "LIGHT_LEVEL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 42, "varName": "LIGHT_LEVEL", "value": 100 },
            { "id": 43, "varName": "LIGHT_LEVEL", "value": "Undefined" }
        ])))
        .mount(&server)
        .await;

    let vars = client.all_item_variable_values(&["LIGHT_LEVEL"]).await.unwrap();

    assert_eq!(vars.len(), 2);
    assert_eq!(vars[0].value, json!(100));
    assert_eq!(vars[1].id, 43);
    assert_eq!(vars[1].value, Value::Null);
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_light_ramp_body_encodes_level_and_time() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(42)))
        .and(header("authorization", "Bearer director-jwt"))
        .and(body_json(json!({
            "async": true,
            "command": "RAMP_TO_LEVEL",
            "tParams": { "LEVEL": 10, "TIME": 10000 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .light(42)
        .ramp_to_level(10, Duration::from_millis(10_000))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_command_unknown_item_is_device_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(9999)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "details": "Item 9999 not found",
            "message": "Not Found"
        })))
        .mount(&server)
        .await;

    let err = assert_err!(client.send_command(9999, "ON", &json!({})).await);

    assert!(
        matches!(err, Error::Device { item_id: 9999, .. }),
        "got: {err:?}"
    );
    assert!(err.response_text().unwrap().contains("Item 9999 not found"));
}

#[tokio::test]
async fn test_send_command_expired_token_stays_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(42)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "details": "Expired or invalid token"
        })))
        .mount(&server)
        .await;

    let err = assert_err!(client.send_command(42, "ON", &json!({})).await);

    assert!(matches!(err, Error::BadToken { .. }), "got: {err:?}");
    assert!(!err.is_device_error());
}

#[tokio::test]
async fn test_send_command_reply_shapes() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(1)))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(commands_path(2)))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued"))
        .mount(&server)
        .await;

    assert_eq!(client.send_command(1, "ON", &json!({})).await.unwrap(), Value::Null);
    assert_eq!(
        client.send_command(2, "ON", &json!({})).await.unwrap(),
        json!("queued")
    );
}

const HTML_401: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>401</title></head>\
                        <body><h1>Unauthorized</h1></body></html>";
const HTML_500: &str = "<!DOCTYPE html><html><body><h1>Internal Server Error</h1><br></body></html>";

#[tokio::test]
async fn test_html_401_page_is_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(
            ResponseTemplate::new(401).set_body_raw(HTML_401, "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let err = assert_err!(client.all_items().await);

    assert!(matches!(err, Error::Authentication { .. }), "got: {err:?}");
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_send_command_html_500_page_is_device_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(42)))
        .respond_with(ResponseTemplate::new(500).set_body_raw(HTML_500, "text/html"))
        .mount(&server)
        .await;

    let err = assert_err!(client.send_command(42, "ON", &json!({})).await);

    assert!(
        matches!(err, Error::Device { item_id: 42, .. }),
        "got: {err:?}"
    );
    assert!(err.is_device_error());
}

// ── Device wrapper tests ────────────────────────────────────────────

#[tokio::test]
async fn test_light_state_and_color() {
    let (server, client) = setup().await;
    mount_variable(&server, 42, "LIGHT_LEVEL", json!("75")).await;
    mount_variable(&server, 42, "LIGHT_STATE", json!(1)).await;

    Mock::given(method("POST"))
        .and(path(commands_path(42)))
        .and(body_json(json!({
            "async": true,
            "command": "SET_COLOR_TARGET",
            "tParams": {
                "LIGHT_COLOR_TARGET_X": 0.6401,
                "LIGHT_COLOR_TARGET_Y": 0.33,
                "LIGHT_COLOR_TARGET_MODE": 0,
                "RATE": 500
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let light = client.light(42);
    assert_eq!(light.level().await.unwrap(), Some(75));
    assert_eq!(light.state().await.unwrap(), Some(true));
    light
        .set_color_hex("#ff0000", Some(Duration::from_millis(500)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_hex_color_sends_nothing() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(42)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = assert_err!(client.light(42).set_color_hex("#12", None).await);

    assert!(matches!(err, Error::InvalidColor { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_lock_state_and_commands() {
    let (server, client) = setup().await;
    mount_variable(&server, 307, "RelayState", json!(0)).await;

    Mock::given(method("POST"))
        .and(path(commands_path(307)))
        .and(body_partial_json(json!({ "command": "CLOSE", "tParams": {} })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let lock = client.lock(307);
    assert_eq!(lock.is_locked().await.unwrap(), Some(true));
    lock.unlock().await.unwrap();
}

#[tokio::test]
async fn test_climate_reads_and_setpoint() {
    let (server, client) = setup().await;
    mount_variable(&server, 100, "TEMPERATURE_F", json!(71.5)).await;
    mount_variable(&server, 100, "HVAC_MODE", json!("Heat")).await;

    Mock::given(method("POST"))
        .and(path(commands_path(100)))
        .and(body_partial_json(json!({
            "command": "SET_SETPOINT_HEAT",
            "tParams": { "FAHRENHEIT": 68.0 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let climate = client.climate(100);
    assert_eq!(climate.temperature_f().await.unwrap(), Some(71.5));
    assert_eq!(climate.hvac_mode().await.unwrap().as_deref(), Some("Heat"));
    climate.set_heat_setpoint(68.0).await.unwrap();
}

#[tokio::test]
async fn test_room_volume_and_blind_target() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(commands_path(12)))
        .and(body_partial_json(json!({
            "command": "SET_VOLUME_LEVEL",
            "tParams": { "LEVEL": 30 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(commands_path(55)))
        .and(body_partial_json(json!({
            "command": "SET_LEVEL_TARGET",
            "tParams": { "LEVEL_TARGET": 40 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_variable(&server, 55, "Battery Level", json!("Undefined")).await;

    client.room(12).set_volume(30).await.unwrap();
    let blind = client.blind(55);
    blind.set_level_target(40).await.unwrap();
    assert_eq!(blind.battery_level().await.unwrap(), None);
}

#[tokio::test]
async fn test_security_panel() {
    let (server, client) = setup().await;
    mount_variable(&server, 300, "DISARMED_STATE", json!(0)).await;
    mount_variable(&server, 300, "HOME_STATE", json!(0)).await;
    mount_variable(&server, 300, "AWAY_STATE", json!(1)).await;
    mount_command_ok(&server, 300).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 300,
            "name": "Partition 1",
            "capabilities": {
                "has_fire": true,
                "has_police": true,
                "arm_types": "Away,Stay"
            }
        }])))
        .mount(&server)
        .await;

    let panel = client.security_panel(300);
    assert_eq!(panel.arm_state().await.unwrap(), Some(ArmState::ArmedAway));
    assert_eq!(panel.emergency_types().await.unwrap(), vec!["Fire", "Police"]);
    assert_eq!(panel.arm_types().await.unwrap(), vec!["Away", "Stay"]);
    panel.disarm("1234").await.unwrap();
}
