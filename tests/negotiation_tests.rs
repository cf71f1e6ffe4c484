//! Session negotiation against a mock Subsonic server.
//!
//! Probe traffic is counted with `Mock::expect`, which the mock server
//! verifies when it is dropped at the end of each test.

mod common;

use common::*;
use serde_json::json;
use sonicbridge::{
    AirsonicPlugin, AuthScheme, ClientOptions, Credentials, SonicError, SubsonicClient,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Scheme selection
// =============================================================================

mod scheme_selection {
    use super::*;

    #[tokio::test]
    async fn token_accepted_negotiates_token() {
        let server = MockServer::start().await;
        discovery_mock("1.16.1").expect(1).mount(&server).await;
        token_probe()
            .respond_with(json_response(ok(
                "1.16.1",
                json!({ "type": "navidrome", "serverVersion": "0.53.3", "openSubsonic": true }),
            )))
            .expect(1)
            .mount(&server)
            .await;
        password_probe()
            .respond_with(json_response(ok("1.16.1", json!({}))))
            .expect(0)
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        let session = client.ensure_session().await.expect("session");

        assert_eq!(session.auth_scheme, AuthScheme::Token);
        assert_eq!(session.negotiated_version, "1.16.1");
        assert_eq!(session.server_kind, "navidrome");
        assert_eq!(session.reported_server_version, "0.53.3");
        assert!(session.supports_extended_capabilities);
    }

    #[tokio::test]
    async fn password_used_when_token_rejected() {
        let server = MockServer::start().await;
        mount_password_server(&server, "1.15.0").await;

        let client = SubsonicClient::new(credentials(&server));
        let session = client.ensure_session().await.expect("session");

        assert_eq!(session.auth_scheme, AuthScheme::Password);
        assert_eq!(session.server_kind, "airsonic");
        assert_eq!(session.reported_server_version, "1.15.0");
        assert!(!session.supports_extended_capabilities);
    }

    #[tokio::test]
    async fn token_transport_failure_falls_back_to_password() {
        let server = MockServer::start().await;
        discovery_mock("1.16.1").mount(&server).await;
        token_probe()
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        password_probe()
            .respond_with(json_response(ok("1.16.1", json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        let session = client.ensure_session().await.expect("session");
        assert_eq!(session.auth_scheme, AuthScheme::Password);
    }

    #[tokio::test]
    async fn slow_token_probe_times_out_and_password_is_tried() {
        let server = MockServer::start().await;
        discovery_mock("1.16.1").mount(&server).await;
        token_probe()
            .respond_with(
                json_response(ok("1.16.1", json!({}))).set_delay(Duration::from_secs(3)),
            )
            .expect(1)
            .mount(&server)
            .await;
        password_probe()
            .respond_with(json_response(ok("1.16.1", json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        let options = ClientOptions {
            probe_timeout_secs: 1,
            ..ClientOptions::default()
        };
        let client = SubsonicClient::with_options(credentials(&server), options);

        let started = Instant::now();
        let session = client.ensure_session().await.expect("session");
        assert_eq!(session.auth_scheme, AuthScheme::Password);
        assert!(started.elapsed() < Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn garbage_token_response_falls_back_to_password() {
        let server = MockServer::start().await;
        discovery_mock("1.16.1").mount(&server).await;
        token_probe()
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;
        password_probe()
            .respond_with(json_response(ok("1.16.1", json!({}))))
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        let session = client.ensure_session().await.expect("session");
        assert_eq!(session.auth_scheme, AuthScheme::Password);
    }

    #[tokio::test]
    async fn password_session_never_sends_token_params() {
        let server = MockServer::start().await;
        mount_password_server(&server, "1.16.1").await;
        Mock::given(method("GET"))
            .and(path("/rest/search3"))
            .and(HasParam("p"))
            .and(LacksParam("t"))
            .and(LacksParam("s"))
            .and(query_param("u", USERNAME))
            .and(query_param("c", "SonicBridge"))
            .and(query_param("v", "1.16.1"))
            .and(query_param("f", "json"))
            .respond_with(json_response(ok(
                "1.16.1",
                json!({ "searchResult3": { "song": songs(2) } }),
            )))
            .expect(2)
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        assert_eq!(client.search_music("blue", 1).await.data.len(), 2);
        assert_eq!(client.search_music("green", 1).await.data.len(), 2);
    }
}

// =============================================================================
// Version discovery
// =============================================================================

mod version_discovery {
    use super::*;

    #[tokio::test]
    async fn discovered_version_is_sent_with_the_probe() {
        let server = MockServer::start().await;
        discovery_mock("1.13.0").expect(1).mount(&server).await;
        token_probe()
            .and(query_param("v", "1.13.0"))
            .respond_with(json_response(ok("1.13.0", json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        let session = client.ensure_session().await.expect("session");
        assert_eq!(session.negotiated_version, "1.13.0");
    }

    #[tokio::test]
    async fn discovery_sends_placeholder_version_and_no_secret() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/ping"))
            .and(query_param("v", "0.0.1"))
            .and(query_param("u", USERNAME))
            .and(LacksParam("t"))
            .and(LacksParam("p"))
            .and(LacksParam("s"))
            .respond_with(json_response(failed("1.16.1", 30, "Incompatible client")))
            .expect(1)
            .mount(&server)
            .await;
        token_probe()
            .respond_with(json_response(ok("1.16.1", json!({}))))
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        client.ensure_session().await.expect("session");
    }

    #[tokio::test]
    async fn failed_discovery_falls_back_to_default_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/ping"))
            .and(LacksParam("t"))
            .and(LacksParam("p"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        token_probe()
            .and(query_param("v", "1.16.1"))
            .respond_with(json_response(json!({ "subsonic-response": { "status": "ok" } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        let session = client.ensure_session().await.expect("session");
        assert_eq!(session.negotiated_version, "1.16.1");
        assert_eq!(session.reported_server_version, "unknown");
    }
}

// =============================================================================
// Caching
// =============================================================================

mod caching {
    use super::*;

    #[tokio::test]
    async fn repeated_calls_probe_once() {
        let server = MockServer::start().await;
        discovery_mock("1.16.1").expect(1).mount(&server).await;
        token_probe()
            .respond_with(json_response(ok("1.16.1", json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        let first = client.ensure_session().await.expect("session");
        let second = client.ensure_session().await.expect("session");
        let third = client.ensure_session().await.expect("session");

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[tokio::test]
    async fn changing_any_credential_renegotiates() {
        let server = MockServer::start().await;
        discovery_mock("1.16.1").expect(3).mount(&server).await;
        token_probe()
            .respond_with(json_response(ok("1.16.1", json!({}))))
            .expect(3)
            .mount(&server)
            .await;

        let other = MockServer::start().await;
        discovery_mock("1.15.0").expect(1).mount(&other).await;
        token_probe()
            .respond_with(json_response(ok("1.15.0", json!({}))))
            .expect(1)
            .mount(&other)
            .await;

        let current = Arc::new(Mutex::new(credentials(&server)));
        let provider = {
            let current = current.clone();
            move || current.lock().unwrap().clone()
        };
        let client = SubsonicClient::new(provider);

        client.ensure_session().await.expect("initial");
        client.ensure_session().await.expect("cached");

        current.lock().unwrap().password = "changed".to_string();
        client.ensure_session().await.expect("after password change");

        current.lock().unwrap().username = "bob".to_string();
        client.ensure_session().await.expect("after username change");

        // Same server, different spelling of the address.
        current.lock().unwrap().address = format!("{}/", server.address());
        client.ensure_session().await.expect("trailing slash is the same address");

        current.lock().unwrap().address = other.uri();
        let session = client.ensure_session().await.expect("after address change");
        assert_eq!(session.negotiated_version, "1.15.0");
    }

    #[tokio::test]
    async fn failed_negotiation_is_not_cached() {
        let server = MockServer::start().await;
        discovery_mock("1.16.1").expect(2).mount(&server).await;
        token_probe()
            .respond_with(json_response(failed("1.16.1", 40, "Wrong username or password.")))
            .expect(2)
            .mount(&server)
            .await;
        password_probe()
            .respond_with(json_response(failed("1.16.1", 40, "Wrong username or password.")))
            .expect(2)
            .mount(&server)
            .await;

        let client = SubsonicClient::new(credentials(&server));
        for _ in 0..2 {
            match client.ensure_session().await {
                Err(SonicError::NegotiationFailed { address }) => {
                    assert_eq!(address, server.uri());
                }
                other => panic!("expected negotiation failure, got {other:?}"),
            }
        }
        assert!(client.cached_session().is_none());
    }
}

// =============================================================================
// Host init
// =============================================================================

mod init {
    use super::*;

    #[tokio::test]
    async fn init_reports_negotiated_session() {
        let server = MockServer::start().await;
        mount_password_server(&server, "1.15.0").await;

        let plugin = AirsonicPlugin::new(credentials(&server));
        let status = plugin.init().await;

        assert!(status.connected);
        assert_eq!(status.version.as_deref(), Some("1.15.0"));
        assert_eq!(status.auth_method.as_deref(), Some("password"));
        assert_eq!(status.server_type.as_deref(), Some("airsonic"));
        assert_eq!(status.open_subsonic, Some(false));
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn address_without_scheme_is_reached_over_http() {
        let server = MockServer::start().await;
        mount_token_server(&server, "1.16.1").await;

        let creds = Credentials::new(server.address().to_string(), USERNAME, PASSWORD);
        let status = AirsonicPlugin::new(creds).init().await;
        assert!(status.connected);
        assert_eq!(status.auth_method.as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn unreachable_server_reports_disconnected() {
        // Nothing listens on the discard port.
        let creds = Credentials::new("127.0.0.1:9", USERNAME, PASSWORD);
        let plugin = AirsonicPlugin::new(creds);

        let status = plugin.init().await;
        assert!(!status.connected);
        assert!(status.error.is_some());

        let page = plugin.search("anything", 1, "music").await;
        assert!(page.is_end);
        assert!(page.data.is_empty());
        assert!(plugin.get_top_lists().await.is_empty());
    }
}
