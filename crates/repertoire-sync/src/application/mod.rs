//! Lifecycle handlers and the collaborators they share.

pub mod album_handlers;
pub mod artist_handlers;
pub mod context;
mod deletion;
pub mod projection;
pub mod registry;
pub mod song_handlers;
pub mod storage_cleanup;
pub mod user_handlers;

#[cfg(test)]
mod test_fixture;
