use html2text::from_read;
use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("URL pattern is valid"));

/// Strip markup and bare links so they are not read aloud.
///
/// Whitespace is left as-is; the segmenter normalizes it.
pub fn clean_text(text: &str) -> String {
    let plain_text = from_read(text.as_bytes(), usize::MAX);
    URL_PATTERN.replace_all(&plain_text, "").into_owned()
}
