//! Catalog database schema.

/// SQL to create the catalog tables read by [`crate::PgCatalogRepository`].
pub const CREATE_CATALOG_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS artists (
    id          UUID PRIMARY KEY,
    user_id     UUID NOT NULL,
    name        VARCHAR(255) NOT NULL,
    image_url   TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS albums (
    id            UUID PRIMARY KEY,
    user_id       UUID NOT NULL,
    title         VARCHAR(255) NOT NULL,
    release_date  DATE,
    image_url     TEXT,
    artist_id     UUID REFERENCES artists (id) ON DELETE SET NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS songs (
    id            UUID PRIMARY KEY,
    user_id       UUID NOT NULL,
    title         VARCHAR(255) NOT NULL,
    release_date  DATE,
    image_url     TEXT,
    artist_id     UUID REFERENCES artists (id) ON DELETE SET NULL,
    album_id      UUID REFERENCES albums (id) ON DELETE SET NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_albums_artist_id ON albums (artist_id);
CREATE INDEX IF NOT EXISTS idx_songs_artist_id ON songs (artist_id);
CREATE INDEX IF NOT EXISTS idx_songs_album_id ON songs (album_id);
";
