//! SonicBridge
//!
//! Source adapter that lets a media-player host browse and stream from an
//! Airsonic (or any Subsonic-compatible) server through its REST API.
//!
//! # Features
//!
//! - **Session negotiation**: discovers the server's API version and whether it
//!   accepts token or plain-password authentication, once per credential set
//! - **Browsing**: search (music/album/artist), album tracks, artist works,
//!   top lists
//! - **Playback**: direct stream URLs with credentials embedded, server lyrics
//!
//! Every host-facing operation degrades to an empty result instead of failing.
//!
//! # Example
//!
//! ```ignore
//! use sonicbridge::{AirsonicPlugin, Credentials};
//!
//! #[tokio::main]
//! async fn main() {
//!     let plugin = AirsonicPlugin::new(Credentials::new("music.local:4040", "alice", "sesame"));
//!
//!     let status = plugin.init().await;
//!     println!("connected: {}", status.connected);
//!
//!     let page = plugin.search("miles davis", 1, "album").await;
//!     println!("{} albums, last page: {}", page.data.len(), page.is_end);
//! }
//! ```

pub mod api;
pub mod config;
mod error;
pub mod plugin;

pub use api::{
    AlbumItem, ArtistItem, ArtistWorksType, AuthScheme, Envelope, LyricResult, MediaItem,
    MediaSource, MusicItem, PagedResult, SearchType, ServerStatus, Session, SessionCache,
    SubsonicClient, TopListDetail, TopListEntry, TopListGroup, PAGE_SIZE, TOP_LIST_SIZE,
};
pub use config::{ClientOptions, CredentialFingerprint, CredentialProvider, Credentials};
pub use error::{Result, SonicError};
pub use plugin::{AirsonicPlugin, PluginManifest, UserVariable};
