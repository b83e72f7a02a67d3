//! Search documents.
//!
//! All document types share one index, so every id carries its type as a
//! prefix: `song-<uuid>`, `album-<uuid>`. Relation summaries are copies taken
//! when the document was built, not live references; a stale summary is only
//! corrected by a later update of the document that embeds it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use repertoire_core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Discriminates document kinds in the shared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// An artist document.
    Artist,
    /// An album document.
    Album,
    /// A song document.
    Song,
    /// A playlist document.
    Playlist,
}

impl DocumentType {
    /// The lowercase name used in ids and the `type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DocumentType::Artist => "artist",
            DocumentType::Album => "album",
            DocumentType::Song => "song",
            DocumentType::Playlist => "playlist",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(DocumentType::Artist),
            "album" => Ok(DocumentType::Album),
            "song" => Ok(DocumentType::Song),
            "playlist" => Ok(DocumentType::Playlist),
            other => Err(DomainError::Validation(format!(
                "unknown document type: {other}"
            ))),
        }
    }
}

/// Type-prefixed document identifier, `<type>-<uuid>` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId {
    /// Document kind.
    pub doc_type: DocumentType,
    /// Primary-store id of the entity.
    pub id: Uuid,
}

impl DocumentId {
    /// Creates an id for an entity of the given type.
    #[must_use]
    pub const fn new(doc_type: DocumentType, id: Uuid) -> Self {
        Self { doc_type, id }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.doc_type, self.id)
    }
}

impl FromStr for DocumentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, raw_id) = s
            .split_once('-')
            .ok_or_else(|| DomainError::Validation(format!("malformed document id: {s}")))?;
        let id = Uuid::parse_str(raw_id)
            .map_err(|e| DomainError::Validation(format!("malformed document id {s}: {e}")))?;
        Ok(Self::new(prefix.parse()?, id))
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Denormalized copy of an artist embedded in child documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSummary {
    /// Artist id.
    pub id: Uuid,
    /// Artist name.
    pub name: String,
    /// Artist image reference.
    pub image_url: Option<String>,
    /// When the artist last changed.
    pub updated_at: DateTime<Utc>,
}

/// Denormalized copy of an album embedded in song documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    /// Album id.
    pub id: Uuid,
    /// Album title.
    pub title: String,
    /// Album cover reference.
    pub image_url: Option<String>,
    /// When the album last changed.
    pub updated_at: DateTime<Utc>,
}

/// Search projection of an artist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSearch {
    pub id: DocumentId,
    pub user_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Search projection of an album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSearch {
    pub id: DocumentId,
    pub user_id: Uuid,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub artist: Option<ArtistSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Search projection of a song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSearch {
    pub id: DocumentId,
    pub user_id: Uuid,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub artist: Option<ArtistSummary>,
    pub album: Option<AlbumSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Search projection of a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSearch {
    pub id: DocumentId,
    pub user_id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Any document stored in the shared index. The variant is written to the
/// document's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchDocument {
    Artist(ArtistSearch),
    Album(AlbumSearch),
    Song(SongSearch),
    Playlist(PlaylistSearch),
}

impl SearchDocument {
    /// The document's index id.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        match self {
            SearchDocument::Artist(doc) => doc.id,
            SearchDocument::Album(doc) => doc.id,
            SearchDocument::Song(doc) => doc.id,
            SearchDocument::Playlist(doc) => doc.id,
        }
    }

    /// The user that owns the document.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        match self {
            SearchDocument::Artist(doc) => doc.user_id,
            SearchDocument::Album(doc) => doc.user_id,
            SearchDocument::Song(doc) => doc.user_id,
            SearchDocument::Playlist(doc) => doc.user_id,
        }
    }

    /// The document's type.
    #[must_use]
    pub fn doc_type(&self) -> DocumentType {
        self.id().doc_type
    }

    /// Id of the artist summarized in this document, if any.
    #[must_use]
    pub fn artist_ref(&self) -> Option<Uuid> {
        match self {
            SearchDocument::Album(doc) => doc.artist.as_ref().map(|a| a.id),
            SearchDocument::Song(doc) => doc.artist.as_ref().map(|a| a.id),
            SearchDocument::Artist(_) | SearchDocument::Playlist(_) => None,
        }
    }

    /// Id of the album summarized in this document, if any.
    #[must_use]
    pub fn album_ref(&self) -> Option<Uuid> {
        match self {
            SearchDocument::Song(doc) => doc.album.as_ref().map(|a| a.id),
            _ => None,
        }
    }
}

/// Reads an explicit `null` as `Some(None)` so a patch can tell "clear this
/// field" apart from "leave it alone".
fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Sparse update of an album document. `None` leaves a field untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPatch {
    pub id: DocumentId,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "explicit_null"
    )]
    pub artist: Option<Option<ArtistSummary>>,
}

/// Sparse update of a song document. `None` leaves a field untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    pub id: DocumentId,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "explicit_null"
    )]
    pub artist: Option<Option<ArtistSummary>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "explicit_null"
    )]
    pub album: Option<Option<AlbumSummary>>,
}

/// A sparse document update, tagged by document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentPatch {
    Album(AlbumPatch),
    Song(SongPatch),
}

impl DocumentPatch {
    /// The id of the patched document.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        match self {
            DocumentPatch::Album(patch) => patch.id,
            DocumentPatch::Song(patch) => patch.id,
        }
    }
}

/// One entry of an update batch: a rebuilt document or a sparse patch.
/// Both merge into the indexed document by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "document", rename_all = "lowercase")]
pub enum DocumentUpdate {
    Full(SearchDocument),
    Patch(DocumentPatch),
}

impl DocumentUpdate {
    /// The id of the document being updated.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        match self {
            DocumentUpdate::Full(doc) => doc.id(),
            DocumentUpdate::Patch(patch) => patch.id(),
        }
    }

    /// The JSON body the engine merges into the stored document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if encoding fails.
    pub fn to_index_json(&self) -> Result<serde_json::Value, DomainError> {
        Ok(match self {
            DocumentUpdate::Full(doc) => serde_json::to_value(doc)?,
            DocumentUpdate::Patch(patch) => serde_json::to_value(patch)?,
        })
    }
}

impl From<SearchDocument> for DocumentUpdate {
    fn from(doc: SearchDocument) -> Self {
        DocumentUpdate::Full(doc)
    }
}
