//! File-backed feed source for running without network access.
//!
//! Serves a saved copy of the CPCB feed as if it were the live document.

use std::path::{Path, PathBuf};

use super::FeedSource;
use super::error::FeedError;

/// Feed source that reads the document from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for FileFeedSource {
    async fn fetch(&self) -> Result<String, FeedError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FeedError::Io {
                message: format!("{}: {}", self.path.display(), e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_saved_feed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(&path, "<AqIndex/>").unwrap();

        let source = FileFeedSource::new(&path);
        assert_eq!(source.fetch().await.unwrap(), "<AqIndex/>");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let source = FileFeedSource::new(dir.path().join("absent.xml"));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FeedError::Io { .. }));
    }

    #[tokio::test]
    async fn bundled_sample_feed_parses() {
        let source = FileFeedSource::new("data/sample_feed.xml");
        let xml = source.fetch().await.unwrap();
        let snapshot = super::super::parse_feed(&xml, chrono::Utc::now()).unwrap();
        assert!(snapshot.complete_stations().count() >= 5);
    }
}
