//! Entity lifecycle event payloads.
//!
//! Created and Deleted events carry the entity as the publisher saw it;
//! Deleted events carry it as captured before the delete. Updated events
//! carry only ids, since handlers re-read the current state anyway.

use repertoire_core::model::{Album, Artist, Song};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to a deleted parent's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildDisposition {
    /// The children were deleted with the parent and are listed on the
    /// parent's payload.
    Cascade,
    /// The children still exist and only lost their reference to the
    /// parent.
    #[default]
    Unlink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCreated {
    pub artist: Artist,
}

/// An album was created. `album.artist` is set when the artist was created
/// in the same operation; otherwise only `album.artist_id` is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumCreated {
    pub album: Album,
}

/// A song was created. Embedded `artist`/`album` objects are parents created
/// in the same operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongCreated {
    pub song: Song,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistUpdated {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumUpdated {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongUpdated {
    pub id: Uuid,
}

/// Several albums changed in a way their songs' copies must reflect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumsUpdated {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongsUpdated {
    pub ids: Vec<Uuid>,
}

/// An artist was deleted. With `Cascade`, `artist.albums` and
/// `artist.songs` list the children deleted with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDeleted {
    pub artist: Artist,
    #[serde(default)]
    pub children: ChildDisposition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistsDeleted {
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub children: ChildDisposition,
}

/// An album was deleted. With `Cascade`, `album.songs` lists the songs
/// deleted with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDeleted {
    pub album: Album,
    #[serde(default)]
    pub children: ChildDisposition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumsDeleted {
    pub albums: Vec<Album>,
    #[serde(default)]
    pub children: ChildDisposition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDeleted {
    pub song: Song,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongsDeleted {
    pub songs: Vec<Song>,
}

/// A user account and everything it owned was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDeleted {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_disposition_defaults_to_unlink() {
        let json = serde_json::json!({
            "album": {
                "id": Uuid::new_v4(),
                "userId": Uuid::new_v4(),
                "title": "Origin of Symmetry",
                "createdAt": "2026-01-15T10:00:00Z",
                "updatedAt": "2026-01-15T10:00:00Z"
            }
        });

        let event: AlbumDeleted = serde_json::from_value(json).unwrap();

        assert_eq!(event.children, ChildDisposition::Unlink);
        assert!(event.album.songs.is_empty());
    }

    #[test]
    fn test_disposition_is_lowercase_on_the_wire() {
        let event = ArtistsDeleted {
            artists: Vec::new(),
            children: ChildDisposition::Cascade,
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["children"], "cascade");
    }
}
