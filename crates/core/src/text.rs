//! Text clean-up for content that arrives HTML-escaped from the trivia API.

/// Decodes HTML character references (`&quot;`, `&#039;`, `&eacute;`, ...).
///
/// Unknown or malformed references are left untouched.
#[must_use]
pub fn decode_html(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}
