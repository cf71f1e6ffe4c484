// Authenticated request plumbing and direct stream URLs.
impl SubsonicClient {
    /// Base parameter set for `scheme`. TOKEN gets a fresh salt and digest
    /// on every call.
    fn auth_params(
        &self,
        credentials: &Credentials,
        scheme: AuthScheme,
        version: &str,
    ) -> Vec<(String, String)> {
        let mut params = vec![("u".to_string(), credentials.username.clone())];
        match scheme {
            AuthScheme::Token => {
                let salt = generate_salt();
                let token = token_for(&credentials.password, &salt);
                params.push(("s".to_string(), salt));
                params.push(("t".to_string(), token));
            }
            AuthScheme::Password => {
                params.push(("p".to_string(), credentials.password.clone()));
            }
        }
        params.push(("c".to_string(), self.options.client_name.clone()));
        params.push(("v".to_string(), version.to_string()));
        params.push(("f".to_string(), RESPONSE_FORMAT.to_string()));
        params
    }

    async fn get_json(
        &self,
        base: &str,
        endpoint: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<Value> {
        let url = format!("{base}/rest/{endpoint}");
        debug!(endpoint = %endpoint, "Issuing Subsonic request");

        let response = HTTP_CLIENT
            .get(&url)
            .query(params)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SonicError::HttpStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let credentials = self.current_credentials()?;
        let session = self.ensure_session_for(&credentials).await?;
        let base = credentials.normalized_address();
        let auth = self.auth_params(&credentials, session.auth_scheme, &session.negotiated_version);
        let params = merge_params(auth, params);
        self.get_json(&base, endpoint, &params, self.options.request_timeout())
            .await
    }

    /// Raw JSON document for `endpoint`, or `None` when the configuration is
    /// incomplete, no session could be negotiated, or the request failed.
    pub async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> Option<Value> {
        match self.request(endpoint, params).await {
            Ok(document) => Some(document),
            Err(SonicError::IncompleteConfig) => {
                debug!(endpoint = %endpoint, "Skipping request, configuration incomplete");
                None
            }
            Err(err) => {
                error!(endpoint = %endpoint, error = %err, "Subsonic request failed");
                None
            }
        }
    }

    /// Success payload of `endpoint`; a `failed` envelope is an error.
    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let document = self.request(endpoint, params).await?;
        Envelope::decode(document)?.into_payload()
    }

    /// Direct URL the player can stream from, with credentials embedded as
    /// query parameters in the negotiated scheme.
    pub async fn stream_url(&self, song_id: &str) -> Result<String> {
        let credentials = self.current_credentials()?;
        let session = self.ensure_session_for(&credentials).await?;
        let base = credentials.normalized_address();
        reqwest::Url::parse(&base).map_err(|e| SonicError::InvalidUrl(format!("{base}: {e}")))?;

        let mut url = format!(
            "{}/rest/stream?u={}&c={}&v={}&f={}&id={}",
            base,
            urlencoding::encode(&credentials.username),
            urlencoding::encode(&self.options.client_name),
            urlencoding::encode(&session.negotiated_version),
            RESPONSE_FORMAT,
            urlencoding::encode(song_id)
        );

        match session.auth_scheme {
            AuthScheme::Token => {
                let salt = generate_salt();
                let token = token_for(&credentials.password, &salt);
                url.push_str(&format!("&s={salt}&t={token}"));
            }
            AuthScheme::Password => {
                url.push_str(&format!("&p={}", urlencoding::encode(&credentials.password)));
            }
        }

        Ok(url)
    }

    pub async fn get_media_source(&self, music: &MusicItem) -> Option<MediaSource> {
        let Some(id) = music.id.as_deref() else {
            warn!("Track without id has no stream");
            return None;
        };

        match self.stream_url(id).await {
            Ok(url) => Some(MediaSource { url }),
            Err(SonicError::IncompleteConfig) => None,
            Err(err) => {
                error!(track = %id, error = %err, "Could not resolve stream URL");
                None
            }
        }
    }
}
