use thiserror::Error;

/// Failure kinds produced while acquiring a track's assets.
///
/// The Display output doubles as the reason text in the failure log, so
/// each variant renders as `<Kind>Error: <detail>`.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Navigation failed, the URL was invalid, or the page content never
    /// rendered within the timeout.
    #[error("LoadError: {0}")]
    Load(String),

    /// An expected field was absent from rendered or parsed content.
    #[error("ExtractionError: {0}")]
    Extraction(String),

    /// An expected media metadata entry was absent, or no image candidate
    /// matched the selection filter.
    #[error("NotFoundError: {0}")]
    NotFound(String),

    /// Transport or HTTP failure while streaming a download.
    #[error("DownloadError: {0}")]
    Download(String),

    /// Local file-system failure while writing an output.
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
}
