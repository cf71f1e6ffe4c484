// Subsonic envelope classification and projections into host items.

/// A decoded `subsonic-response` object.
#[derive(Debug, Clone)]
pub enum Envelope {
    Success { payload: Value },
    Failure { code: i64, reason: String, payload: Value },
}

impl Envelope {
    /// Pulls the `subsonic-response` object out of a response document.
    pub fn decode(document: Value) -> Result<Self> {
        let Value::Object(mut root) = document else {
            return Err(SonicError::MalformedResponse(
                "response is not a JSON object".to_string(),
            ));
        };
        let payload = match root.remove("subsonic-response") {
            Some(payload @ Value::Object(_)) => payload,
            _ => {
                return Err(SonicError::MalformedResponse(
                    "missing subsonic-response".to_string(),
                ))
            }
        };

        if json_pick_string(&payload, &["status"]).as_deref() == Some("ok") {
            return Ok(Self::Success { payload });
        }

        let error = json_pick_value(&payload, &["error"]);
        let code = error
            .and_then(|e| json_pick_i64(e, &["code"]))
            .unwrap_or(0);
        let reason = error
            .and_then(|e| json_pick_string(e, &["message"]))
            .unwrap_or_else(|| "Unknown error".to_string());
        Ok(Self::Failure {
            code,
            reason,
            payload,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// API version the server reports. Present on failures as well.
    pub fn version(&self) -> Option<String> {
        json_pick_string(self.payload(), &["version"])
    }

    pub fn payload(&self) -> &Value {
        match self {
            Self::Success { payload } | Self::Failure { payload, .. } => payload,
        }
    }

    pub fn into_payload(self) -> Result<Value> {
        match self {
            Self::Success { payload } => Ok(payload),
            Self::Failure { code, reason, .. } => Err(SonicError::ServerFailure {
                code,
                message: reason,
            }),
        }
    }
}

pub fn format_music_item(it: &Value) -> MusicItem {
    MusicItem {
        id: json_pick_string(it, &["id"]),
        title: json_pick_string(it, &["title"]),
        artist: json_pick_string(it, &["artist"]),
        album: json_pick_string(it, &["album"]),
        duration: json_pick_u64(it, &["duration"]),
        artwork: json_pick_string(it, &["coverArt"]),
        album_id: json_pick_string(it, &["albumId"]),
        artist_id: json_pick_string(it, &["artistId"]),
        track: json_pick_u64(it, &["track"]),
        year: json_pick_u64(it, &["year"]),
        genre: json_pick_string(it, &["genre"]),
        bit_rate: json_pick_u64(it, &["bitRate"]),
        size: json_pick_u64(it, &["size"]),
        suffix: json_pick_string(it, &["suffix"]),
        content_type: json_pick_string(it, &["contentType"]),
        path: json_pick_string(it, &["path"]),
    }
}

pub fn format_album_item(it: &Value) -> AlbumItem {
    AlbumItem {
        id: json_pick_string(it, &["id"]),
        title: json_pick_string(it, &["name"]),
        artist: json_pick_string(it, &["artist"]),
        artwork: json_pick_string(it, &["coverArt"]),
        artist_id: json_pick_string(it, &["artistId"]),
        song_count: json_pick_u64(it, &["songCount"]),
        duration: json_pick_u64(it, &["duration"]),
        created: json_pick_string(it, &["created"]),
        year: json_pick_u64(it, &["year"]),
        genre: json_pick_string(it, &["genre"]),
    }
}

pub fn format_artist_item(it: &Value) -> ArtistItem {
    ArtistItem {
        id: json_pick_string(it, &["id"]),
        name: json_pick_string(it, &["name"]),
        avatar: json_pick_string(it, &["artistImageUrl"]),
        album_count: json_pick_u64(it, &["albumCount"]),
        starred: json_pick_string(it, &["starred"]),
    }
}

pub fn format_top_list_entry(album: &Value) -> TopListEntry {
    let artist = json_pick_string(album, &["artist"]);
    let tracks = json_pick_u64(album, &["songCount"]).map(|count| {
        if count == 1 {
            "1 track".to_string()
        } else {
            format!("{count} tracks")
        }
    });
    let description = match (artist, tracks) {
        (Some(artist), Some(tracks)) => Some(format!("{artist} - {tracks}")),
        (Some(artist), None) => Some(artist),
        (None, Some(tracks)) => Some(tracks),
        (None, None) => None,
    };

    TopListEntry {
        id: json_pick_string(album, &["id"]),
        title: json_pick_string(album, &["name"]),
        cover_img: json_pick_string(album, &["coverArt"]),
        description,
    }
}
