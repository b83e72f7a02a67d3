//! Integration tests for GET /search.

mod common;

use axum::http::StatusCode;
use repertoire_api::auth::AuthenticatedUser;
use repertoire_core::model::{Artist, Song};
use repertoire_search::domain::documents::{
    ArtistSearch, DocumentId, DocumentType, SearchDocument, SongSearch,
};
use uuid::Uuid;

fn artist_doc(user_id: Uuid, name: &str) -> SearchDocument {
    let artist = Artist::new(Uuid::new_v4(), user_id, name, common::fixed_time());
    SearchDocument::Artist(ArtistSearch {
        id: DocumentId::new(DocumentType::Artist, artist.id),
        user_id,
        name: artist.name,
        image_url: None,
        created_at: artist.created_at,
        updated_at: artist.updated_at,
    })
}

fn song_doc(user_id: Uuid, title: &str) -> SearchDocument {
    let song = Song::new(Uuid::new_v4(), user_id, title, common::fixed_time());
    SearchDocument::Song(SongSearch {
        id: DocumentId::new(DocumentType::Song, song.id),
        user_id,
        title: song.title,
        release_date: None,
        image_url: None,
        artist: None,
        album: None,
        created_at: song.created_at,
        updated_at: song.updated_at,
    })
}

#[tokio::test]
async fn test_search_without_user_returns_401() {
    let app = common::spawn_app();

    let (status, json) = common::get_json(app.router, "/search?q=muse", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_search_returns_only_callers_documents_without_owner() {
    // Arrange
    let app = common::spawn_app();
    let user_id = Uuid::new_v4();
    app.engine.seed(artist_doc(user_id, "Muse"));
    app.engine.seed(song_doc(user_id, "Muscle Museum"));
    app.engine.seed(artist_doc(Uuid::new_v4(), "Muse"));

    // Act
    let (status, json) = common::get_json(
        app.router,
        "/search?q=mus",
        Some(AuthenticatedUser { user_id }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalCount"], 2);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|hit| hit.get("userId").is_none()));
    assert!(results.iter().all(|hit| hit["type"].is_string()));
}

#[tokio::test]
async fn test_search_filters_by_type_and_pages() {
    // Arrange
    let app = common::spawn_app();
    let user_id = Uuid::new_v4();
    app.engine.seed(artist_doc(user_id, "Muse"));
    app.engine.seed(song_doc(user_id, "Uprising"));
    app.engine.seed(song_doc(user_id, "Resistance"));

    // Act
    let (status, json) = common::get_json(
        app.router,
        "/search?type=song&page=2&pageSize=1",
        Some(AuthenticatedUser { user_id }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalCount"], 2);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["type"], "song");
}

#[tokio::test]
async fn test_search_unknown_type_returns_400() {
    let app = common::spawn_app();

    let (status, json) = common::get_json(
        app.router,
        "/search?q=x&type=podcast",
        Some(AuthenticatedUser {
            user_id: Uuid::new_v4(),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_search_engine_failure_returns_500() {
    let app = common::spawn_app();
    app.engine.fail_all();

    let (status, json) = common::get_json(
        app.router,
        "/search?q=x",
        Some(AuthenticatedUser {
            user_id: Uuid::new_v4(),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "infrastructure_error");
}
