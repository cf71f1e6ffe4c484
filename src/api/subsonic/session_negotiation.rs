// Session negotiation: version discovery, then TOKEN and PASSWORD probes in order.

fn session_from_probe(payload: &Value, scheme: AuthScheme, fallback_version: &str) -> Session {
    let version = json_pick_string(payload, &["version"]);
    Session {
        negotiated_version: version
            .clone()
            .unwrap_or_else(|| fallback_version.to_string()),
        server_kind: json_pick_string(payload, &["type"])
            .unwrap_or_else(|| DEFAULT_SERVER_KIND.to_string()),
        reported_server_version: json_pick_string(payload, &["serverVersion"])
            .or(version)
            .unwrap_or_else(|| UNKNOWN_SERVER_VERSION.to_string()),
        supports_extended_capabilities: json_pick_bool(payload, &["openSubsonic"])
            .unwrap_or(false),
        auth_scheme: scheme,
    }
}

impl SubsonicClient {
    pub fn new(credentials: impl CredentialProvider + 'static) -> Self {
        Self::with_options(credentials, ClientOptions::default())
    }

    pub fn with_options(
        credentials: impl CredentialProvider + 'static,
        options: ClientOptions,
    ) -> Self {
        Self {
            credentials: Box::new(credentials),
            options,
            sessions: SessionCache::new(),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The session negotiated for the last credential set, if any.
    pub fn cached_session(&self) -> Option<Arc<Session>> {
        self.sessions.get()
    }

    fn current_credentials(&self) -> Result<Credentials> {
        let credentials = self.credentials.credentials();
        if credentials.is_complete() {
            Ok(credentials)
        } else {
            Err(SonicError::IncompleteConfig)
        }
    }

    /// Returns the session for the current credentials, probing the server
    /// only when none is cached for them.
    pub async fn ensure_session(&self) -> Result<Arc<Session>> {
        let credentials = self.current_credentials()?;
        self.ensure_session_for(&credentials).await
    }

    async fn ensure_session_for(&self, credentials: &Credentials) -> Result<Arc<Session>> {
        if let Some(session) = self.sessions.invalidate_if_changed(credentials) {
            return Ok(session);
        }

        let base = credentials.normalized_address();
        let version = self.discover_version(&base, credentials).await;
        debug!(address = %base, version = %version, "Negotiating Subsonic session");

        for scheme in AuthScheme::PROBE_ORDER {
            match self.probe(&base, credentials, scheme, &version).await {
                Ok(session) => {
                    info!(
                        address = %base,
                        auth = scheme.key(),
                        version = %session.negotiated_version,
                        server = %session.server_kind,
                        "Subsonic session negotiated"
                    );
                    return Ok(self.sessions.store(credentials, session));
                }
                Err(err) => {
                    warn!(address = %base, auth = scheme.key(), error = %err, "Authentication probe failed");
                }
            }
        }

        Err(SonicError::NegotiationFailed { address: base })
    }

    /// Best effort: servers report their API version even when they reject
    /// the request, so no secret is sent here.
    async fn discover_version(&self, base: &str, credentials: &Credentials) -> String {
        let params = vec![
            ("u".to_string(), credentials.username.clone()),
            ("c".to_string(), self.options.client_name.clone()),
            ("v".to_string(), DISCOVERY_VERSION.to_string()),
            ("f".to_string(), RESPONSE_FORMAT.to_string()),
        ];

        let discovered = match self
            .get_json(base, "ping", &params, self.options.probe_timeout())
            .await
            .and_then(Envelope::decode)
        {
            Ok(envelope) => envelope.version(),
            Err(err) => {
                debug!(address = %base, error = %err, "Version discovery failed");
                None
            }
        };

        discovered.unwrap_or_else(|| self.options.default_version.clone())
    }

    async fn probe(
        &self,
        base: &str,
        credentials: &Credentials,
        scheme: AuthScheme,
        version: &str,
    ) -> Result<Session> {
        let params = self.auth_params(credentials, scheme, version);
        let document = self
            .get_json(base, "ping", &params, self.options.probe_timeout())
            .await?;
        let payload = Envelope::decode(document)?.into_payload()?;
        Ok(session_from_probe(
            &payload,
            scheme,
            &self.options.default_version,
        ))
    }

    /// Connection summary for the host's `init()`.
    pub async fn server_status(&self) -> ServerStatus {
        match self.ensure_session().await {
            Ok(session) => ServerStatus {
                connected: true,
                version: Some(session.negotiated_version.clone()),
                server_type: Some(session.server_kind.clone()),
                server_version: Some(session.reported_server_version.clone()),
                open_subsonic: Some(session.supports_extended_capabilities),
                auth_method: Some(session.auth_scheme.key().to_string()),
                error: None,
            },
            Err(err) => {
                warn!(error = %err, "Server connection failed");
                ServerStatus::disconnected(err.to_string())
            }
        }
    }
}
