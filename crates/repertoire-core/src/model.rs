//! Catalog entities as they are read from the primary store.
//!
//! Associations are optional: an entity carries a populated parent or
//! children collection only when the repository call that produced it
//! loads them (`get_with_associations` and friends). A bare foreign key
//! with an empty association means "not loaded", never "absent".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A performing artist or band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Primary key.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Reference to the artist's image in storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Albums by this artist, when loaded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub albums: Vec<Album>,
    /// Songs by this artist, when loaded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub songs: Vec<Song>,
}

impl Artist {
    /// Creates an artist with no associations loaded.
    #[must_use]
    pub fn new(id: Uuid, user_id: Uuid, name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            name: name.into(),
            image_url: None,
            created_at: at,
            updated_at: at,
            albums: Vec::new(),
            songs: Vec::new(),
        }
    }
}

/// An album, optionally attached to an artist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Primary key.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Album title.
    pub title: String,
    /// Release date, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    /// Reference to the album cover in storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Foreign key to the artist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<Uuid>,
    /// The artist, when loaded or created together with the album.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<Box<Artist>>,
    /// Songs on this album, when loaded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub songs: Vec<Song>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Album {
    /// Creates an album with no associations loaded.
    #[must_use]
    pub fn new(id: Uuid, user_id: Uuid, title: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            release_date: None,
            image_url: None,
            artist_id: None,
            artist: None,
            songs: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }
}

/// A song in the user's repertoire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Primary key.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Song title.
    pub title: String,
    /// Release date, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    /// Reference to the song's image in storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Foreign key to the artist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<Uuid>,
    /// The artist, when loaded or created together with the song.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<Box<Artist>>,
    /// Foreign key to the album.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<Uuid>,
    /// The album, when loaded or created together with the song.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<Box<Album>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Creates a song with no associations loaded.
    #[must_use]
    pub fn new(id: Uuid, user_id: Uuid, title: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            release_date: None,
            image_url: None,
            artist_id: None,
            artist: None,
            album_id: None,
            album: None,
            created_at: at,
            updated_at: at,
        }
    }
}
