use regex::Regex;
use scraper::{Html, Selector};

use sunodl_model::page::{PageFields, RenderedPage};
use sunodl_model::sanitize::UNKNOWN_TITLE;

/// Marketing suffix the site appends to track descriptions; removed from
/// every extracted prompt.
pub const PROMPT_SUFFIX: &str = " song. Listen and make your own with Suno.";

/// Which `meta[content]` element (0-based, document order) serves as the
/// prompt fallback when no script payload carries it.
const FALLBACK_META_INDEX: usize = 2;

/// Derive the four logical fields from one rendered page. Pure; absent
/// lyrics or prompt are represented as None, not errors.
pub fn page_fields(page: &RenderedPage) -> PageFields {
    let title = page
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let lyrics = page.lyrics.clone().filter(|l| !l.trim().is_empty());

    PageFields {
        title,
        html: page.html.clone(),
        lyrics,
        prompt: extract_prompt(&page.html),
    }
}

/// Extract the generation prompt from page HTML.
///
/// Looks for the `gpt_description_prompt` key in `<script>` payloads,
/// first as real JSON, then as an escaped JSON fragment. Falls back to the
/// content of the third `<meta content=...>` element. Returns None when
/// neither source yields a non-empty value after suffix removal.
pub fn extract_prompt(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let script_sel = Selector::parse("script").expect("valid selector");
    for script in document.select(&script_sel) {
        let text: String = script.text().collect();
        if !text.contains("gpt_description_prompt") {
            continue;
        }
        if let Some(prompt) = prompt_from_script(&text) {
            return Some(prompt);
        }
    }

    let meta_sel = Selector::parse("meta[content]").expect("valid selector");
    document
        .select(&meta_sel)
        .nth(FALLBACK_META_INDEX)
        .and_then(|meta| meta.value().attr("content"))
        .map(strip_prompt_suffix)
        .filter(|prompt| !prompt.is_empty())
}

fn prompt_from_script(script: &str) -> Option<String> {
    // Script payloads come in two shapes: real JSON documents, and JS
    // string literals carrying escaped JSON. Try the structured read
    // first, then the fragment regex.
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(script) {
        if let Some(found) = find_string_key(&value, "gpt_description_prompt") {
            let prompt = strip_prompt_suffix(found);
            if !prompt.is_empty() {
                return Some(prompt);
            }
        }
    }

    let re = Regex::new(r#"gpt_description_prompt\\?"\s*:\s*\\?"?([^\\"]+)"#).unwrap();
    let captured = re.captures(script)?.get(1)?.as_str();
    let prompt = strip_prompt_suffix(captured);
    (!prompt.is_empty()).then_some(prompt)
}

/// Depth-first search for the first string value stored under `key`.
fn find_string_key<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(s)) = map.get(key) {
                return Some(s);
            }
            map.values().find_map(|v| find_string_key(v, key))
        }
        serde_json::Value::Array(items) => items.iter().find_map(|v| find_string_key(v, key)),
        _ => None,
    }
}

/// Remove every occurrence of the fixed marketing suffix and trim.
pub fn strip_prompt_suffix(raw: &str) -> String {
    raw.replace(PROMPT_SUFFIX, "").trim().to_string()
}
