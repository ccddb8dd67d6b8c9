use std::time::Duration;

use sunodl_model::error::AcquireError;

pub mod browser;
pub mod download;
pub mod extract;
pub mod media;
pub mod output;

pub use browser::PageLoader;
pub use download::Downloader;
pub use media::MediaLocator;

const USER_AGENT: &str = "sunodl/0.1 (suno track downloader)";

/// Connect and between-bytes read timeout for plain fetches and downloads.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// The real collaborators behind one run: a browser page loader, and a
/// media locator plus streaming downloader sharing one HTTP session.
pub struct SunoClient {
    pub loader: PageLoader,
    pub locator: MediaLocator,
    pub downloader: Downloader,
}

impl SunoClient {
    pub fn new() -> Result<Self, AcquireError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(HTTP_TIMEOUT)
            .read_timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AcquireError::Load(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            loader: PageLoader::new(),
            locator: MediaLocator::new(client.clone()),
            downloader: Downloader::new(client),
        })
    }
}
