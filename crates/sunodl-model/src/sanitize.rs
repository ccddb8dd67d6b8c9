use unicode_normalization::UnicodeNormalization;

/// Title used for naming when a page provides none.
pub const UNKNOWN_TITLE: &str = "Unknown_Song";

/// Sanitize a track title for use as a file name.
///
/// Normalizes to NFC first so accented characters have a single
/// representation, then replaces the characters Windows and Unix file
/// systems reject (`< > : " / \ | ? *`) with `_`.
pub fn sanitize_filename(title: &str) -> String {
    let nfc: String = title.nfc().collect();
    nfc.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

/// Normalize extracted text to NFC and strip trailing whitespace per line.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();

    nfc.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of blank lines left over from DOM text extraction into a
/// single blank line.
pub fn collapse_blank_lines(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_blank = false;

    for line in input.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && prev_blank {
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(line);
        prev_blank = is_blank;
    }

    result
}
