//! CLI command handlers. Each command is in its own file.

mod download;
mod list;
mod session;
mod watch;

pub use download::{run_download, run_download_all};
pub use list::run_list;
pub use session::run_session;
pub use watch::run_watch;

use anyhow::Result;
use songsync_core::config::SyncConfig;
use songsync_core::links::ServerLinks;
use songsync_core::session::{self as core_session, SessionStore};
use songsync_core::source::{HttpSongSource, SongSource};
use std::sync::Arc;

/// Shared state for command handlers: config, resolved URLs, session store.
pub struct Context {
    pub cfg: SyncConfig,
    pub links: ServerLinks,
    pub store: SessionStore,
}

impl Context {
    pub fn new(cfg: SyncConfig) -> Result<Self> {
        let links = ServerLinks::new(&cfg.server_url, &cfg.list_path)?;
        let store = SessionStore::open_default()?;
        Ok(Self { cfg, links, store })
    }

    /// Ask the server for a new session id and persist it.
    pub async fn new_session(&self) -> Result<String> {
        let base = self.links.base().to_string();
        let cookie = self.cfg.session_cookie.clone();
        let timeout = self.cfg.connect_timeout();
        let id = tokio::task::spawn_blocking(move || core_session::establish(&base, &cookie, timeout))
            .await??;
        self.store.save(&id)?;
        Ok(id)
    }

    /// Stored session id, or a freshly established one. Without a session the
    /// server returns an empty list, so failure here is only a warning.
    pub async fn session_id(&self) -> Option<String> {
        match self.store.load() {
            Ok(Some(id)) => return Some(id),
            Ok(None) => {}
            Err(e) => tracing::warn!("could not read session: {:#}", e),
        }
        match self.new_session().await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("could not establish session: {:#}", e);
                None
            }
        }
    }

    pub fn cookie_header(&self, session_id: Option<&str>) -> Option<String> {
        session_id.map(|id| core_session::cookie_header(&self.cfg.session_cookie, id))
    }

    pub fn source(&self, session_id: Option<&str>) -> Result<Arc<dyn SongSource>> {
        Ok(Arc::new(HttpSongSource::new(&self.links, &self.cfg, session_id)?))
    }
}
