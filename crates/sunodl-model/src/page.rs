use crate::item::OutputKind;

/// Rendered page state returned by the page loader: the DOM after
/// browser-side script execution settled.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Document title, if the page has one.
    pub title: Option<String>,
    /// Full HTML markup of the rendered DOM.
    pub html: String,
    /// Visible text of the lyrics region, if the selector matched and was
    /// non-empty.
    pub lyrics: Option<String>,
}

/// The four logical fields derived from one rendered page.
#[derive(Debug, Clone)]
pub struct PageFields {
    pub title: String,
    pub html: String,
    pub lyrics: Option<String>,
    pub prompt: Option<String>,
}

/// Candidate media URLs scanned from a track page's metadata tags.
#[derive(Debug, Clone, Default)]
pub struct MediaUrls {
    pub video: Option<String>,
    pub audio: Option<String>,
    pub image: Option<String>,
}

impl MediaUrls {
    /// The located URL for a media kind. Text kinds have none.
    pub fn url_for(&self, kind: OutputKind) -> Option<&str> {
        match kind {
            OutputKind::Video => self.video.as_deref(),
            OutputKind::Audio => self.audio.as_deref(),
            OutputKind::Image => self.image.as_deref(),
            _ => None,
        }
    }
}

/// Media scan result plus the page title parsed from the same document,
/// used to name media files when the browser pipeline never ran.
#[derive(Debug, Clone, Default)]
pub struct MediaPage {
    pub title: Option<String>,
    pub urls: MediaUrls,
}
