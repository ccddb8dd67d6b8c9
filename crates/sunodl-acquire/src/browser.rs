use std::time::Duration;

use headless_chrome::Browser;

use sunodl_model::error::AcquireError;
use sunodl_model::page::RenderedPage;

/// CSS selector for the lyrics region of a track page. It doubles as the
/// render sentinel: a page that never produces it never rendered.
pub const LYRICS_SELECTOR: &str = "section.w-full > div:nth-child(1)";

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);
const CONTENT_TIMEOUT: Duration = Duration::from_secs(20);

/// Renders track pages in headless Chrome.
///
/// One browser process per page load, torn down when the handle drops, on
/// success and failure alike.
pub struct PageLoader {
    navigation_timeout: Duration,
    content_timeout: Duration,
}

impl Default for PageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PageLoader {
    pub fn new() -> Self {
        Self {
            navigation_timeout: NAVIGATION_TIMEOUT,
            content_timeout: CONTENT_TIMEOUT,
        }
    }

    /// Render the page and return its title, markup, and lyrics text.
    ///
    /// The browser session is blocking, so it runs on the tokio blocking
    /// pool. Fails with LoadError when the URL is invalid, navigation
    /// fails, or the content selector never appears within its timeout.
    pub async fn load(&self, url: &str) -> Result<RenderedPage, AcquireError> {
        let url = url.to_string();
        let navigation_timeout = self.navigation_timeout;
        let content_timeout = self.content_timeout;

        tokio::task::spawn_blocking(move || render(&url, navigation_timeout, content_timeout))
            .await
            .map_err(|e| AcquireError::Load(format!("browser task failed: {e}")))?
    }
}

fn render(
    url: &str,
    navigation_timeout: Duration,
    content_timeout: Duration,
) -> Result<RenderedPage, AcquireError> {
    url::Url::parse(url).map_err(|e| AcquireError::Load(format!("invalid URL {url}: {e}")))?;

    let browser = Browser::default()
        .map_err(|e| AcquireError::Load(format!("failed to launch browser: {e}")))?;
    let tab = browser
        .new_tab()
        .map_err(|e| AcquireError::Load(format!("failed to open tab: {e}")))?;
    tab.set_default_timeout(navigation_timeout);

    tracing::debug!(url = %url, "Navigating");
    tab.navigate_to(url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| AcquireError::Load(format!("navigation failed for {url}: {e}")))?;

    let lyrics_region = tab
        .wait_for_element_with_custom_timeout(LYRICS_SELECTOR, content_timeout)
        .map_err(|e| AcquireError::Load(format!("content never rendered for {url}: {e}")))?;

    // A present but empty region means the track has no lyrics, not that
    // the page failed.
    let lyrics = lyrics_region
        .get_inner_text()
        .ok()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let title = tab.get_title().ok().filter(|title| !title.is_empty());
    let html = tab
        .get_content()
        .map_err(|e| AcquireError::Load(format!("failed to read page markup for {url}: {e}")))?;

    tracing::debug!(url = %url, bytes = html.len(), has_lyrics = lyrics.is_some(), "Rendered");
    Ok(RenderedPage { title, html, lyrics })
}
