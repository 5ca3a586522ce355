//! Song list fetch over HTTP (libcurl).

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::SyncConfig;
use crate::links::ServerLinks;
use crate::session;
use crate::song::{self, Song};

use super::{FetchError, SongSource};

/// GETs the list endpoint, sending the session cookie when one is known.
#[derive(Debug, Clone)]
pub struct HttpSongSource {
    list_url: String,
    cookie: Option<String>,
    connect_timeout: Duration,
    timeout: Option<Duration>,
}

impl HttpSongSource {
    pub fn new(links: &ServerLinks, cfg: &SyncConfig, session_id: Option<&str>) -> Result<Self> {
        Ok(Self {
            list_url: links.list_url()?.to_string(),
            cookie: session_id.map(|id| session::cookie_header(&cfg.session_cookie, id)),
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.request_timeout(),
        })
    }

    pub fn list_url(&self) -> &str {
        &self.list_url
    }
}

impl SongSource for HttpSongSource {
    fn fetch(&self, abort: &AtomicBool) -> Result<Option<Vec<Song>>, FetchError> {
        if abort.load(Ordering::Relaxed) {
            return Err(FetchError::Aborted);
        }
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.list_url)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        if let Some(t) = self.timeout {
            easy.timeout(t)?;
        }

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        if let Some(cookie) = &self.cookie {
            list.append(cookie)?;
        }
        easy.http_headers(list)?;
        // Progress callbacks run at least once a second, even while stalled.
        easy.progress(true)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(|_, _, _, _| !abort.load(Ordering::Relaxed))?;
            if let Err(e) = transfer.perform() {
                return Err(if e.is_aborted_by_callback() {
                    FetchError::Aborted
                } else {
                    e.into()
                });
            }
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }

        Ok(song::parse_song_list(&body)?)
    }
}
