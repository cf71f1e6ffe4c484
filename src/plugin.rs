//! Host-facing entry points.
//!
//! The host speaks in string keys (`"music"`, `"album"`, ...) and expects an
//! empty shape rather than an error when anything goes wrong. This module maps
//! that contract onto [`SubsonicClient`].

use crate::api::{
    AlbumItem, ArtistItem, ArtistWorksType, LyricResult, MediaItem, MediaSource, MusicItem,
    PagedResult, SearchType, ServerStatus, SubsonicClient, TopListDetail, TopListEntry,
    TopListGroup,
};
use crate::config::{ClientOptions, CredentialProvider};
use serde::Serialize;
use tracing::warn;

pub const PLATFORM_NAME: &str = "Airsonic Advanced";

/// A configuration field the host shows to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserVariable {
    pub key: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub platform: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub supported_search_type: Vec<&'static str>,
    pub user_variables: Vec<UserVariable>,
}

impl PluginManifest {
    pub fn new() -> Self {
        Self {
            platform: PLATFORM_NAME,
            version: env!("CARGO_PKG_VERSION"),
            description: "Browse and stream from Airsonic and other Subsonic-compatible servers; \
                          detects server version and authentication method automatically",
            supported_search_type: SearchType::ALL.iter().map(|t| t.key()).collect(),
            user_variables: vec![
                UserVariable {
                    key: "url",
                    name: "Server address",
                },
                UserVariable {
                    key: "username",
                    name: "Username",
                },
                UserVariable {
                    key: "password",
                    name: "Password",
                },
            ],
        }
    }
}

impl Default for PluginManifest {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct AirsonicPlugin {
    client: SubsonicClient,
}

impl AirsonicPlugin {
    pub fn new(credentials: impl CredentialProvider + 'static) -> Self {
        Self {
            client: SubsonicClient::new(credentials),
        }
    }

    pub fn with_options(
        credentials: impl CredentialProvider + 'static,
        options: ClientOptions,
    ) -> Self {
        Self {
            client: SubsonicClient::with_options(credentials, options),
        }
    }

    pub fn manifest(&self) -> PluginManifest {
        PluginManifest::new()
    }

    pub fn client(&self) -> &SubsonicClient {
        &self.client
    }

    /// Tests the connection, negotiating a session if needed.
    pub async fn init(&self) -> ServerStatus {
        self.client.server_status().await
    }

    pub async fn search(&self, query: &str, page: u32, search_type: &str) -> PagedResult<MediaItem> {
        match SearchType::from_key(search_type) {
            Some(kind) => self.client.search(query, page, kind).await,
            None => {
                warn!(search_type = %search_type, "Unsupported search type");
                PagedResult::empty()
            }
        }
    }

    /// Album detail is a single page whatever `page` is asked for.
    pub async fn get_album_info(&self, album: &AlbumItem, _page: u32) -> PagedResult<MusicItem> {
        self.client.get_album_info(album).await
    }

    pub async fn get_artist_works(
        &self,
        artist: &ArtistItem,
        _page: u32,
        works_type: &str,
    ) -> PagedResult<MediaItem> {
        match ArtistWorksType::from_key(works_type) {
            Some(works) => self.client.get_artist_works(artist, works).await,
            None => {
                warn!(works_type = %works_type, "Unsupported artist works type");
                PagedResult::empty()
            }
        }
    }

    pub async fn get_top_lists(&self) -> Vec<TopListGroup> {
        self.client.get_top_lists().await
    }

    pub async fn get_top_list_detail(&self, entry: &TopListEntry) -> TopListDetail {
        self.client.get_top_list_detail(entry).await
    }

    pub async fn get_media_source(&self, music: &MusicItem) -> Option<MediaSource> {
        self.client.get_media_source(music).await
    }

    pub async fn get_lyric(&self, music: &MusicItem) -> Option<LyricResult> {
        self.client.get_lyric(music).await
    }
}
