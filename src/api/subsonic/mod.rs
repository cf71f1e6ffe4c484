use crate::api::models::*;
use crate::api::session::{AuthScheme, Session, SessionCache};
use crate::config::{ClientOptions, CredentialProvider, Credentials};
use crate::error::{Result, SonicError};
use once_cell::sync::Lazy;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Placeholder version sent while we do not know what the server speaks.
const DISCOVERY_VERSION: &str = "0.0.1";
const DEFAULT_SERVER_KIND: &str = "airsonic";
const UNKNOWN_SERVER_VERSION: &str = "unknown";
const RESPONSE_FORMAT: &str = "json";
const SALT_LEN: usize = 12;

/// Request adapter for a Subsonic-family server.
///
/// Reads the current credentials from the host on every call, negotiates a
/// [`Session`] the first time a credential set is seen, and reuses it until
/// the credentials change.
pub struct SubsonicClient {
    credentials: Box<dyn CredentialProvider>,
    options: ClientOptions,
    sessions: SessionCache,
}

impl std::fmt::Debug for SubsonicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubsonicClient")
            .field("options", &self.options)
            .field("session", &self.sessions.get())
            .finish_non_exhaustive()
    }
}

fn json_pick_value<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let object = value.as_object()?;
    for key in keys {
        if let Some(found) = object.get(*key) {
            if !found.is_null() {
                return Some(found);
            }
        }
    }
    None
}

fn json_pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    let picked = json_pick_value(value, keys)?;
    match picked {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        _ => None,
    }
}

fn json_pick_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    let picked = json_pick_value(value, keys)?;
    match picked {
        Value::Number(number) => {
            if let Some(unsigned) = number.as_u64() {
                return Some(unsigned);
            }
            if let Some(signed) = number.as_i64() {
                return Some(signed.max(0) as u64);
            }
            if let Some(float) = number.as_f64() {
                if float.is_finite() && float >= 0.0 {
                    return Some(float.round() as u64);
                }
            }
            None
        }
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn json_pick_i64(value: &Value, keys: &[&str]) -> Option<i64> {
    let picked = json_pick_value(value, keys)?;
    match picked {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn json_pick_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    let picked = json_pick_value(value, keys)?;
    match picked {
        Value::Bool(boolean) => Some(*boolean),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        },
        Value::Number(number) => {
            if let Some(unsigned) = number.as_u64() {
                Some(unsigned > 0)
            } else if let Some(signed) = number.as_i64() {
                Some(signed > 0)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Child list under `key`. Some servers collapse a one-element list into a
/// bare object, so that is accepted too.
fn json_pick_list<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    match json_pick_value(value, &[key]) {
        Some(Value::Array(items)) => items.iter().filter(|item| item.is_object()).collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}

include!("response_models.rs");
include!("session_negotiation.rs");
include!("request_and_stream.rs");
include!("library_browsing.rs");
include!("search_and_lyrics.rs");

fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    (0..SALT_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + (idx - 10)) as char
            }
        })
        .collect()
}

fn token_for(password: &str, salt: &str) -> String {
    format!("{:x}", md5::compute(format!("{password}{salt}").as_bytes()))
}

/// Operation parameters win over the authentication set on key collision.
fn merge_params(base: Vec<(String, String)>, extra: &[(&str, String)]) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = base
        .into_iter()
        .filter(|(key, _)| !extra.iter().any(|(extra_key, _)| extra_key == key))
        .collect();
    merged.extend(
        extra
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone())),
    );
    merged
}
