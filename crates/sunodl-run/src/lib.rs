use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use sunodl_acquire::SunoClient;
use sunodl_model::error::AcquireError;
use sunodl_model::page::{MediaPage, RenderedPage};

pub mod coordinator;

pub use coordinator::{Coordinator, ItemOutcome, RunSummary};

/// The narrow contract the coordinator needs from the outside world:
/// render a page, locate media URLs, download one resource.
///
/// The real implementation drives a browser and an HTTP session; tests
/// substitute a fake.
#[async_trait]
pub trait SiteClient: Send + Sync {
    async fn render_page(&self, url: &str) -> Result<RenderedPage, AcquireError>;
    async fn locate_media(&self, url: &str) -> Result<MediaPage, AcquireError>;
    async fn download(&self, url: &str, dest: &Path) -> Result<(), AcquireError>;
}

#[async_trait]
impl SiteClient for SunoClient {
    async fn render_page(&self, url: &str) -> Result<RenderedPage, AcquireError> {
        self.loader.load(url).await
    }

    async fn locate_media(&self, url: &str) -> Result<MediaPage, AcquireError> {
        self.locator.locate(url).await
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), AcquireError> {
        self.downloader.download(url, dest).await
    }
}

/// Read the URL list file: one URL per line, blank lines skipped.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read URL list {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
