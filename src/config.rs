use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CLIENT_NAME: &str = "SonicBridge";
pub const DEFAULT_API_VERSION: &str = "1.16.1";

const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 120;

/// The three user-supplied strings the host hands over.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, alias = "url")]
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.address.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }

    /// Address with a scheme, `http://` assumed when none was given.
    pub fn normalized_address(&self) -> String {
        let address = self.address.trim();
        let address = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };
        address.trim_end_matches('/').to_string()
    }

    /// Cache key for the negotiated session. Never sent to the server.
    pub fn fingerprint(&self) -> CredentialFingerprint {
        // Length-prefix each field so ("a:b", "c") and ("a", "b:c") differ.
        let address = self.normalized_address();
        let mut context = md5::Context::new();
        for field in [address.as_str(), self.username.as_str(), self.password.as_str()] {
            context.consume(field.len().to_string().as_bytes());
            context.consume(b":");
            context.consume(field.as_bytes());
        }
        CredentialFingerprint(format!("{:x}", context.compute()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialFingerprint(String);

impl CredentialFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where the adapter reads the current credentials from on every operation.
///
/// The host owns user configuration; the adapter only ever asks for the
/// current triple and never stores it beyond the session fingerprint.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Credentials;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Credentials {
        self.clone()
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Credentials + Send + Sync,
{
    fn credentials(&self) -> Credentials {
        self()
    }
}

/// Internal tuning knobs. Not part of the host-visible configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub client_name: String,
    pub probe_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub default_version: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            client_name: CLIENT_NAME.to_string(),
            probe_timeout_secs: 10,
            request_timeout_secs: 15,
            default_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ClientOptions {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(
            self.probe_timeout_secs
                .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
        )
    }
}
