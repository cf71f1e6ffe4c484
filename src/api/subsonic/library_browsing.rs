// Album and artist detail, artist track aggregation, and the top-list sections.
impl SubsonicClient {
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<MusicItem>> {
        let payload = self.fetch("getAlbum", &[("id", album_id.to_string())]).await?;
        let album = json_pick_value(&payload, &["album"])
            .ok_or_else(|| SonicError::MalformedResponse("getAlbum without album".to_string()))?;
        Ok(json_pick_list(album, "song")
            .into_iter()
            .map(format_music_item)
            .collect())
    }

    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<Value>> {
        let payload = self
            .fetch("getArtist", &[("id", artist_id.to_string())])
            .await?;
        let artist = json_pick_value(&payload, &["artist"])
            .ok_or_else(|| SonicError::MalformedResponse("getArtist without artist".to_string()))?;
        Ok(json_pick_list(artist, "album").into_iter().cloned().collect())
    }

    /// Tracks of an album. Never paginated.
    pub async fn get_album_info(&self, album: &AlbumItem) -> PagedResult<MusicItem> {
        let Some(album_id) = album.id.as_deref() else {
            return PagedResult::empty();
        };

        match self.album_tracks(album_id).await {
            Ok(tracks) => PagedResult::complete(tracks),
            Err(err) => {
                log_degraded("getAlbum", &err);
                PagedResult::empty()
            }
        }
    }

    pub async fn get_artist_albums(&self, artist: &ArtistItem) -> PagedResult<AlbumItem> {
        let Some(artist_id) = artist.id.as_deref() else {
            return PagedResult::empty();
        };

        match self.artist_albums(artist_id).await {
            Ok(albums) => PagedResult::complete(albums.iter().map(format_album_item).collect()),
            Err(err) => {
                log_degraded("getArtist", &err);
                PagedResult::empty()
            }
        }
    }

    /// Every track of every album of the artist, in album-list order.
    ///
    /// Album details are fetched one at a time; an album whose fetch fails
    /// contributes nothing and the walk continues.
    pub async fn get_artist_tracks(&self, artist: &ArtistItem) -> PagedResult<MusicItem> {
        let Some(artist_id) = artist.id.as_deref() else {
            return PagedResult::empty();
        };

        let albums = match self.artist_albums(artist_id).await {
            Ok(albums) => albums,
            Err(err) => {
                log_degraded("getArtist", &err);
                return PagedResult::empty();
            }
        };

        let mut tracks = Vec::new();
        for album in &albums {
            let Some(album_id) = json_pick_string(album, &["id"]) else {
                continue;
            };
            match self.album_tracks(&album_id).await {
                Ok(album_tracks) => tracks.extend(album_tracks),
                Err(err) => {
                    warn!(album = %album_id, error = %err, "Skipping album while collecting artist tracks");
                }
            }
        }

        PagedResult::complete(tracks)
    }

    pub async fn get_artist_works(
        &self,
        artist: &ArtistItem,
        works: ArtistWorksType,
    ) -> PagedResult<MediaItem> {
        match works {
            ArtistWorksType::Album => self
                .get_artist_albums(artist)
                .await
                .map(MediaItem::Album),
            ArtistWorksType::Music => self
                .get_artist_tracks(artist)
                .await
                .map(MediaItem::Music),
        }
    }

    async fn album_list_section(&self, list_type: &str) -> Result<Vec<TopListEntry>> {
        let payload = self
            .fetch(
                "getAlbumList2",
                &[
                    ("type", list_type.to_string()),
                    ("size", TOP_LIST_SIZE.to_string()),
                ],
            )
            .await?;
        let albums = json_pick_value(&payload, &["albumList2"])
            .map(|list| json_pick_list(list, "album"))
            .unwrap_or_default();
        Ok(albums.into_iter().map(format_top_list_entry).collect())
    }

    /// Newest, recently played and random albums, fetched in that order.
    /// A section that fails comes back empty; the others are unaffected.
    pub async fn get_top_lists(&self) -> Vec<TopListGroup> {
        if let Err(err) = self.ensure_session().await {
            log_degraded("getAlbumList2", &err);
            return Vec::new();
        }

        let mut groups = Vec::with_capacity(TOP_LIST_SECTIONS.len());
        for (list_type, title) in TOP_LIST_SECTIONS {
            let data = match self.album_list_section(list_type).await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(list = list_type, error = %err, "Top-list section unavailable");
                    Vec::new()
                }
            };
            groups.push(TopListGroup {
                title: title.to_string(),
                data,
            });
        }
        groups
    }

    pub async fn get_top_list_detail(&self, entry: &TopListEntry) -> TopListDetail {
        let album = AlbumItem {
            id: entry.id.clone(),
            ..AlbumItem::default()
        };
        let tracks = self.get_album_info(&album).await;
        TopListDetail {
            entry: entry.clone(),
            music_list: tracks.data,
        }
    }
}

const TOP_LIST_SECTIONS: [(&str, &str); 3] = [
    ("newest", "Newest Albums"),
    ("recent", "Recently Played"),
    ("random", "Random Albums"),
];

fn log_degraded(endpoint: &str, err: &SonicError) {
    match err {
        SonicError::IncompleteConfig => {
            debug!(endpoint = %endpoint, "Configuration incomplete, returning empty result")
        }
        _ => error!(endpoint = %endpoint, error = %err, "Request failed, returning empty result"),
    }
}
