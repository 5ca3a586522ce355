//! Server URL building: list endpoint and download targets.

use anyhow::{Context, Result};
use url::Url;

/// Resolved endpoints of one song server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLinks {
    base: Url,
    list_path: String,
}

impl ServerLinks {
    /// Parse `server_url` (e.g. `http://host:5000` or `http://host/app/`).
    ///
    /// Paths are resolved relative to the base, so a server mounted under a
    /// prefix keeps its prefix.
    pub fn new(server_url: &str, list_path: &str) -> Result<Self> {
        let mut base = Url::parse(server_url)
            .with_context(|| format!("invalid server URL: {}", server_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("server URL cannot be a base: {}", server_url);
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            list_path: list_path.trim_start_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn list_url(&self) -> Result<Url> {
        self.base
            .join(&self.list_path)
            .context("build song list URL")
    }

    /// `<base>/download/<file_name>`, with `file_name` encoded as one path segment.
    pub fn download_url(&self, file_name: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("server URL cannot be a base"))?
            .pop_if_empty()
            .push("download")
            .push(file_name);
        Ok(url)
    }

    /// `<base>/download/all`: a zip of every song in the session.
    pub fn download_all_url(&self) -> Result<Url> {
        self.base.join("download/all").context("build download-all URL")
    }
}
