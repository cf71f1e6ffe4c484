//! Shared mock-server fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use sonicbridge::Credentials;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockBuilder, MockServer, Request, ResponseTemplate};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "sesame";

/// Matches when the query string carries `key`.
pub struct HasParam(pub &'static str);

impl Match for HasParam {
    fn matches(&self, request: &Request) -> bool {
        request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

/// Matches when the query string does not carry `key`.
pub struct LacksParam(pub &'static str);

impl Match for LacksParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

pub fn credentials(server: &MockServer) -> Credentials {
    Credentials::new(server.uri(), USERNAME, PASSWORD)
}

pub fn ok(version: &str, body: Value) -> Value {
    let mut inner = json!({ "status": "ok", "version": version });
    if let (Some(inner), Value::Object(extra)) = (inner.as_object_mut(), body) {
        inner.extend(extra);
    }
    json!({ "subsonic-response": inner })
}

pub fn failed(version: &str, code: i64, message: &str) -> Value {
    json!({
        "subsonic-response": {
            "status": "failed",
            "version": version,
            "error": { "code": code, "message": message }
        }
    })
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Version discovery ping: carries neither a token nor a password.
pub fn discovery_mock(version: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path("/rest/ping"))
        .and(LacksParam("t"))
        .and(LacksParam("p"))
        .respond_with(json_response(failed(
            version,
            10,
            "Required parameter is missing.",
        )))
}

pub fn token_probe() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path("/rest/ping"))
        .and(HasParam("t"))
}

pub fn password_probe() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path("/rest/ping"))
        .and(HasParam("p"))
}

/// Mounts a server that speaks `version` and accepts token authentication.
pub async fn mount_token_server(server: &MockServer, version: &str) {
    discovery_mock(version).mount(server).await;
    token_probe()
        .respond_with(json_response(ok(
            version,
            json!({ "type": "airsonic", "openSubsonic": false }),
        )))
        .mount(server)
        .await;
}

/// Mounts a server that rejects tokens and accepts plain passwords.
pub async fn mount_password_server(server: &MockServer, version: &str) {
    discovery_mock(version).mount(server).await;
    token_probe()
        .respond_with(json_response(failed(
            version,
            41,
            "Token authentication not supported for LDAP users.",
        )))
        .mount(server)
        .await;
    password_probe()
        .respond_with(json_response(ok(version, json!({}))))
        .mount(server)
        .await;
}

pub fn song(id: &str, album_id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Track {id}"),
        "artist": "Miles Davis",
        "album": format!("Album {album_id}"),
        "albumId": album_id,
        "coverArt": album_id,
        "duration": 300,
        "bitRate": 320,
        "suffix": "flac"
    })
}

pub fn songs(count: usize) -> Vec<Value> {
    (0..count).map(|i| song(&format!("tr-{i}"), "al-x")).collect()
}

pub fn album(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artist": "Miles Davis",
        "artistId": "ar-1",
        "coverArt": id,
        "songCount": 2,
        "year": 1959
    })
}
