// Version-gated search and lyrics lookup.
impl SubsonicClient {
    /// One page of raw search hits of `kind`. `page` is 1-based.
    async fn search_page(&self, query: &str, page: u32, kind: SearchType) -> Result<Vec<Value>> {
        // Negotiate first so the endpoint choice sees this server's version.
        let session = self.ensure_session().await?;
        let (endpoint, result_key) = if session.supports_search3() {
            ("search3", "searchResult3")
        } else {
            ("search2", "searchResult2")
        };

        let (count_key, offset_key) = kind.paging_keys();
        let offset = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
        let payload = self
            .fetch(
                endpoint,
                &[
                    ("query", query.to_string()),
                    (count_key, PAGE_SIZE.to_string()),
                    (offset_key, offset.to_string()),
                ],
            )
            .await?;

        let Some(result) = json_pick_value(&payload, &[result_key]) else {
            return Ok(Vec::new());
        };
        let list_key = match kind {
            SearchType::Music => "song",
            SearchType::Album => "album",
            SearchType::Artist => "artist",
        };
        Ok(json_pick_list(result, list_key).into_iter().cloned().collect())
    }

    async fn search_as<T>(
        &self,
        query: &str,
        page: u32,
        kind: SearchType,
        format: fn(&Value) -> T,
    ) -> PagedResult<T> {
        match self.search_page(query, page, kind).await {
            Ok(hits) => PagedResult::from_page(hits.iter().map(format).collect()),
            Err(err) => {
                log_degraded(kind.key(), &err);
                PagedResult::empty()
            }
        }
    }

    pub async fn search_music(&self, query: &str, page: u32) -> PagedResult<MusicItem> {
        self.search_as(query, page, SearchType::Music, format_music_item)
            .await
    }

    pub async fn search_albums(&self, query: &str, page: u32) -> PagedResult<AlbumItem> {
        self.search_as(query, page, SearchType::Album, format_album_item)
            .await
    }

    pub async fn search_artists(&self, query: &str, page: u32) -> PagedResult<ArtistItem> {
        self.search_as(query, page, SearchType::Artist, format_artist_item)
            .await
    }

    pub async fn search(&self, query: &str, page: u32, kind: SearchType) -> PagedResult<MediaItem> {
        match kind {
            SearchType::Music => self.search_music(query, page).await.map(MediaItem::Music),
            SearchType::Album => self.search_albums(query, page).await.map(MediaItem::Album),
            SearchType::Artist => self.search_artists(query, page).await.map(MediaItem::Artist),
        }
    }

    /// Server-side lyrics for the track's artist and title. A response
    /// without lyrics is `None`, not an error.
    pub async fn get_lyric(&self, music: &MusicItem) -> Option<LyricResult> {
        let params: Vec<(&str, String)> = [("artist", &music.artist), ("title", &music.title)]
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|value| (key, value)))
            .collect();

        let payload = match self.fetch("getLyrics", &params).await {
            Ok(payload) => payload,
            Err(err) => {
                log_degraded("getLyrics", &err);
                return None;
            }
        };

        let lyrics = json_pick_value(&payload, &["lyrics"])?;
        let raw_lrc = json_pick_string(lyrics, &["value"])?;
        Some(LyricResult { raw_lrc })
    }
}
