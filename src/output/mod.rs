//! Output module for persisting pages and reporting crawl results
//!
//! This module handles:
//! - Preparing the crawl directory
//! - Mapping URLs to files and writing pages
//! - Crawl statistics and progress lines

mod paths;
pub mod stats;

pub use paths::{file_path_for, source_url_for};
pub use stats::{format_progress, print_summary, CrawlSummary};

use crate::SiteError;
use std::path::{Path, PathBuf};

/// Removes and recreates `<base_dir>/crawl`
///
/// # Returns
///
/// * `Ok(PathBuf)` - The fresh crawl directory
/// * `Err(SiteError::OutputDir)` - The directory could not be reset
pub async fn reset_crawl_dir(base_dir: &Path) -> Result<PathBuf, SiteError> {
    let crawl_dir = base_dir.join("crawl");
    let output_err = |source: std::io::Error| SiteError::OutputDir {
        path: crawl_dir.display().to_string(),
        source,
    };

    match tokio::fs::remove_dir_all(&crawl_dir).await {
        Ok(()) => tracing::debug!("Removed previous crawl at {}", crawl_dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(output_err(e)),
    }

    tokio::fs::create_dir_all(&crawl_dir)
        .await
        .map_err(output_err)?;

    Ok(crawl_dir)
}

/// Writes a decoded page, creating parent directories as needed
pub async fn write_page(file: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(file, contents).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reset_crawl_dir_clears_previous_run() {
        let temp = TempDir::new().unwrap();
        let stale = temp.path().join("crawl/old.example.com/page.html");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        let crawl_dir = reset_crawl_dir(temp.path()).await.unwrap();

        assert_eq!(crawl_dir, temp.path().join("crawl"));
        assert!(crawl_dir.is_dir());
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_reset_crawl_dir_fails_on_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = reset_crawl_dir(&blocker).await;
        assert!(matches!(result, Err(SiteError::OutputDir { .. })));
    }

    #[tokio::test]
    async fn test_write_page_creates_directories() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("example.com/docs/deep/page.html");

        write_page(&file, "<p>hi</p>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "<p>hi</p>");
    }
}
