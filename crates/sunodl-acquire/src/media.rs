use scraper::{Html, Selector};

use sunodl_model::error::AcquireError;
use sunodl_model::page::{MediaPage, MediaUrls};

/// Marker a cover-art URL must contain to be selected. Thumbnail URLs
/// lack it and are never used as a fallback.
pub const IMAGE_MARKER: &str = "image_large_";

/// Locates downloadable media URLs by re-fetching a track page without a
/// browser and scanning its metadata tags.
pub struct MediaLocator {
    client: reqwest::Client,
}

impl MediaLocator {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch the raw page HTML and scan it for media URLs.
    ///
    /// Fails with LoadError when the fetch itself fails; absent fields
    /// come back as None and are reported per kind by the caller.
    pub async fn locate(&self, url: &str) -> Result<MediaPage, AcquireError> {
        url::Url::parse(url).map_err(|e| AcquireError::Load(format!("invalid URL {url}: {e}")))?;

        tracing::debug!(url = %url, "Fetching page for media extraction");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::Load(format!("fetch failed for {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::Load(format!("HTTP {status} for {url}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AcquireError::Load(format!("failed to read body of {url}: {e}")))?;

        let media = scan_document(&html);
        tracing::debug!(
            url = %url,
            video = media.urls.video.is_some(),
            audio = media.urls.audio.is_some(),
            image = media.urls.image.is_some(),
            "Scanned metadata tags"
        );
        Ok(media)
    }
}

/// Scan a document's metadata tags for media URLs and its title.
pub fn scan_document(html: &str) -> MediaPage {
    let document = Html::parse_document(html);

    let video = meta_content(&document, r#"meta[property="og:video:url"]"#);
    let audio = meta_content(&document, r#"meta[property="og:audio"]"#);

    // Image candidates in preference order; only a URL carrying the
    // full-size marker is acceptable.
    let mut candidates = Vec::new();
    candidates.extend(meta_content(&document, r#"meta[name="twitter:image"]"#));
    candidates.extend(meta_content(&document, r#"meta[property="og:image"]"#));
    let image = select_image(&candidates).map(str::to_string);

    let title_sel = Selector::parse("title").expect("valid selector");
    let title = document
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    MediaPage {
        title,
        urls: MediaUrls { video, audio, image },
    }
}

/// Pick the cover image from candidate URLs: the first one containing the
/// full-size marker, or nothing. Never an arbitrary fallback.
pub fn select_image(candidates: &[String]) -> Option<&str> {
    candidates
        .iter()
        .find(|url| url.contains(IMAGE_MARKER))
        .map(String::as_str)
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).expect("valid selector");
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
        .filter(|content| !content.is_empty())
}
