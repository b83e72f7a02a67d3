//! Integration tests for `PgCatalogRepository`.
//!
//! These need a live database: `DATABASE_URL=... cargo test -- --ignored`.

use repertoire_catalog_store::PgCatalogRepository;
use repertoire_catalog_store::schema::CREATE_CATALOG_TABLES;
use repertoire_core::error::DomainError;
use repertoire_core::repository::{AlbumRepository, ArtistRepository, SongRepository};
use sqlx::PgPool;
use uuid::Uuid;

async fn connect() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::raw_sql(CREATE_CATALOG_TABLES)
        .execute(&pool)
        .await
        .unwrap();
    pool
}

async fn insert_artist(pool: &PgPool, user_id: Uuid, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO artists (id, user_id, name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(user_id)
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn insert_album(pool: &PgPool, user_id: Uuid, title: &str, artist_id: Option<Uuid>) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO albums (id, user_id, title, artist_id) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(artist_id)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn insert_song(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    artist_id: Option<Uuid>,
    album_id: Option<Uuid>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO songs (id, user_id, title, artist_id, album_id) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(artist_id)
    .bind(album_id)
    .execute(pool)
    .await
    .unwrap();
    id
}

// --- artists ---

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_get_missing_artist_is_not_found() {
    let repo = PgCatalogRepository::new(connect().await);
    let id = Uuid::new_v4();

    let result = ArtistRepository::get(&repo, id).await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity: "artist", id: missing }) if missing == id
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_artist_with_associations_loads_albums_and_songs() {
    // Arrange
    let pool = connect().await;
    let user_id = Uuid::new_v4();
    let artist_id = insert_artist(&pool, user_id, "Muse").await;
    let album_id = insert_album(&pool, user_id, "Drones", Some(artist_id)).await;
    insert_song(&pool, user_id, "Mercy", Some(artist_id), Some(album_id)).await;
    insert_song(&pool, user_id, "Dig Down", Some(artist_id), None).await;
    let repo = PgCatalogRepository::new(pool);

    // Act
    let artist = ArtistRepository::get_with_associations(&repo, artist_id)
        .await
        .unwrap();

    // Assert
    assert_eq!(artist.name, "Muse");
    assert_eq!(artist.albums.len(), 1);
    assert_eq!(artist.albums[0].id, album_id);
    assert_eq!(artist.songs.len(), 2);
}

// --- albums ---

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_album_with_artist_populates_parent() {
    let pool = connect().await;
    let user_id = Uuid::new_v4();
    let artist_id = insert_artist(&pool, user_id, "Muse").await;
    let album_id = insert_album(&pool, user_id, "Absolution", Some(artist_id)).await;
    let repo = PgCatalogRepository::new(pool);

    let album = repo.get_with_artist(album_id).await.unwrap();

    assert_eq!(album.artist.unwrap().id, artist_id);
    assert!(album.songs.is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_bulk_albums_skip_missing_ids_and_group_songs() {
    // Arrange
    let pool = connect().await;
    let user_id = Uuid::new_v4();
    let artist_id = insert_artist(&pool, user_id, "Muse").await;
    let first = insert_album(&pool, user_id, "Showbiz", Some(artist_id)).await;
    let second = insert_album(&pool, user_id, "The 2nd Law", None).await;
    insert_song(&pool, user_id, "Sunburn", Some(artist_id), Some(first)).await;
    insert_song(&pool, user_id, "Muscle Museum", Some(artist_id), Some(first)).await;
    insert_song(&pool, user_id, "Madness", None, Some(second)).await;
    let repo = PgCatalogRepository::new(pool);

    // Act
    let albums = repo
        .get_all_by_ids_with_songs(&[first, Uuid::new_v4(), second])
        .await
        .unwrap();

    // Assert
    assert_eq!(albums.len(), 2);
    let showbiz = albums.iter().find(|album| album.id == first).unwrap();
    assert_eq!(showbiz.songs.len(), 2);
    assert_eq!(showbiz.artist.as_ref().unwrap().name, "Muse");
    let second_law = albums.iter().find(|album| album.id == second).unwrap();
    assert_eq!(second_law.songs.len(), 1);
    assert!(second_law.artist.is_none());
}

// --- songs ---

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_song_with_associations_loads_artist_and_album() {
    let pool = connect().await;
    let user_id = Uuid::new_v4();
    let artist_id = insert_artist(&pool, user_id, "Muse").await;
    let album_id = insert_album(&pool, user_id, "Absolution", Some(artist_id)).await;
    let song_id = insert_song(&pool, user_id, "Hysteria", Some(artist_id), Some(album_id)).await;
    let repo = PgCatalogRepository::new(pool);

    let song = SongRepository::get_with_associations(&repo, song_id)
        .await
        .unwrap();

    assert_eq!(song.artist.unwrap().name, "Muse");
    assert_eq!(song.album.unwrap().title, "Absolution");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_bulk_songs_without_parents_load_bare() {
    let pool = connect().await;
    let user_id = Uuid::new_v4();
    let first = insert_song(&pool, user_id, "Feeling Good", None, None).await;
    let second = insert_song(&pool, user_id, "Map of the Problematique", None, None).await;
    let repo = PgCatalogRepository::new(pool);

    let songs = repo
        .get_all_by_ids_with_associations(&[first, second])
        .await
        .unwrap();

    assert_eq!(songs.len(), 2);
    assert!(songs.iter().all(|song| song.artist.is_none() && song.album.is_none()));
}
