use std::fs;
use std::path::{Path, PathBuf};

use sunodl_model::error::AcquireError;
use sunodl_model::sanitize;

/// Write one text output, creating the kind directory as needed.
///
/// An existing file of the same name is overwritten.
pub fn write_text(dir: &Path, filename: &str, text: &str) -> Result<PathBuf, AcquireError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, text)?;
    tracing::info!(path = %path.display(), bytes = text.len(), "Wrote output");
    Ok(path)
}

/// Light cleanup for lyrics before writing: NFC plus blank-line collapse,
/// since browser text extraction pads generously.
pub fn clean_lyrics(raw: &str) -> String {
    sanitize::collapse_blank_lines(&sanitize::normalize_text(raw))
}

/// First free path for `filename` in `dir`, inserting ` (1)`, ` (2)`, ...
/// before the extension while the name is taken.
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let ext = Path::new(filename).extension().and_then(|s| s.to_str());

    let mut counter = 1u32;
    loop {
        let name = match ext {
            Some(ext) => format!("{stem} ({counter}).{ext}"),
            None => format!("{stem} ({counter})"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
