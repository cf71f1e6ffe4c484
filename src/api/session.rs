//! Negotiated server capabilities and the single-slot cache that holds them.

use crate::config::{CredentialFingerprint, Credentials};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// The two mutually exclusive ways a Subsonic server accepts credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `u`, `s`, `t`: salted md5 of the password, fresh per request.
    Token,
    /// `u`, `p`: password in clear.
    Password,
}

impl AuthScheme {
    /// Probe order during negotiation.
    pub const PROBE_ORDER: [AuthScheme; 2] = [Self::Token, Self::Password];

    pub fn key(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Password => "password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub negotiated_version: String,
    pub server_kind: String,
    pub reported_server_version: String,
    pub supports_extended_capabilities: bool,
    pub auth_scheme: AuthScheme,
}

impl Session {
    /// `search3` exists from API 1.4 onward; older servers only know `search2`.
    pub fn supports_search3(&self) -> bool {
        version_at_least(&self.negotiated_version, 1, 4)
    }
}

/// Compares the leading `major.minor` of a version string.
/// Anything unparsable counts as older.
pub(crate) fn version_at_least(version: &str, major: u32, minor: u32) -> bool {
    let mut parts = version.trim().split('.');
    let Some(found_major) = parts.next().and_then(|p| p.trim().parse::<u32>().ok()) else {
        return false;
    };
    let found_minor = parts
        .next()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(0);
    (found_major, found_minor) >= (major, minor)
}

#[derive(Debug, Default)]
struct CacheSlot {
    fingerprint: Option<CredentialFingerprint>,
    session: Option<Arc<Session>>,
}

/// Holds at most one session and the fingerprint it was negotiated for.
///
/// Concurrent negotiations for the same credentials are not serialized: both
/// probe, and whichever stores last wins.
#[derive(Debug, Default)]
pub struct SessionCache {
    slot: Mutex<CacheSlot>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session, whatever credentials it belongs to.
    pub fn get(&self) -> Option<Arc<Session>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.session.clone()
    }

    /// Returns the cached session if it was negotiated for `credentials`,
    /// otherwise drops it and returns `None`.
    pub fn invalidate_if_changed(&self, credentials: &Credentials) -> Option<Arc<Session>> {
        let fingerprint = credentials.fingerprint();
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.fingerprint.as_ref() == Some(&fingerprint) {
            if let Some(session) = slot.session.clone() {
                return Some(session);
            }
        }
        slot.fingerprint = None;
        slot.session = None;
        None
    }

    /// Replaces the slot with a freshly negotiated session.
    pub fn store(&self, credentials: &Credentials, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.fingerprint = Some(credentials.fingerprint());
        slot.session = Some(session.clone());
        session
    }
}
