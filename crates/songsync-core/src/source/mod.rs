//! Where authoritative song lists come from.
//!
//! A [`SongSource`] performs one blocking fetch. The poller runs it inside
//! `spawn_blocking`, so implementations may block on network I/O, but they
//! must give up soon after the abort token is set.

mod error;
mod http;

pub use error::{FetchError, FetchErrorKind};
pub use http::HttpSongSource;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::song::Song;

/// One fetch of the authoritative list. `Ok(None)` means "no data".
///
/// `abort` is set when the caller no longer wants the result (the poller is
/// shutting down); the fetch should then return an error promptly.
pub trait SongSource: Send + Sync + 'static {
    fn fetch(&self, abort: &AtomicBool) -> Result<Option<Vec<Song>>, FetchError>;
}

/// Run one fetch on the blocking pool.
pub async fn fetch_blocking(
    source: Arc<dyn SongSource>,
    abort: Arc<AtomicBool>,
) -> Result<Option<Vec<Song>>, FetchError> {
    tokio::task::spawn_blocking(move || source.fetch(&abort))
        .await
        .map_err(|e| FetchError::Task(e.to_string()))?
}
