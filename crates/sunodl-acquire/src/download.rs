use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use sunodl_model::error::AcquireError;

/// Streams remote media to disk.
///
/// Bodies are written to a `.part` sibling and renamed into place on
/// success, so a failed transfer never leaves a file at the final path.
/// Single attempt, no retry.
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn download(&self, url: &str, dest: &Path) -> Result<(), AcquireError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let part = part_path(dest);
        match self.stream_to(url, &part).await {
            Ok(bytes) => {
                fs::rename(&part, dest).await?;
                tracing::info!(path = %dest.display(), bytes, "Downloaded");
                Ok(())
            }
            Err(e) => {
                // The temp file may not exist if the request failed before
                // the first byte.
                let _ = fs::remove_file(&part).await;
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, part: &Path) -> Result<u64, AcquireError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::Download(format!("request failed for {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::Download(format!("HTTP {status} for {url}")));
        }

        let mut file = fs::File::create(part).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| AcquireError::Download(format!("transfer failed for {url}: {e}")))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

/// Temp path a download streams into before the rename.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
