//! Fetch error type and its classification for logging.

/// Why a list fetch produced no snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Body was not a song list.
    #[error("malformed song list: {0}")]
    Decode(#[from] serde_json::Error),
    /// The blocking fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Task(String),
    /// The caller set the abort token before the fetch finished.
    #[error("fetch aborted")]
    Aborted,
}

/// Coarse error kind, used to pick log wording and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Connection,
    Http(u32),
    Decode,
    Other,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport(e) => classify_curl_error(e),
            FetchError::Http(code) => FetchErrorKind::Http(*code),
            FetchError::Decode(_) => FetchErrorKind::Decode,
            FetchError::Task(_) | FetchError::Aborted => FetchErrorKind::Other,
        }
    }

    /// Transient errors are expected while the server restarts or the
    /// network blips; the next tick usually recovers.
    pub fn is_transient(&self) -> bool {
        match self.kind() {
            FetchErrorKind::Timeout | FetchErrorKind::Connection => true,
            FetchErrorKind::Http(code) => code == 429 || (500..=599).contains(&code),
            FetchErrorKind::Decode | FetchErrorKind::Other => false,
        }
    }
}

fn classify_curl_error(e: &curl::Error) -> FetchErrorKind {
    if e.is_operation_timedout() {
        return FetchErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FetchErrorKind::Connection;
    }
    FetchErrorKind::Other
}
