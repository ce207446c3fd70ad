//! Script-element stripping.
//!
//! This is a denylist, not an HTML sanitizer. It removes well-formed
//! `<script ...>...</script>` pairs and nothing else: event-handler
//! attributes, `javascript:` URLs, `<iframe>`, obfuscated or nested
//! payloads all pass through. Do not rely on it as an injection defence;
//! escape or use a real sanitizer at the output boundary.

use std::sync::OnceLock;

use regex::Regex;

// ASCII case-insensitive tag name: `(?i)` folds Unicode too, so `ſ` would
// match `s`. Body may span lines, shortest body wins.
const SCRIPT_PATTERN: &str =
    r"(?s)<[sS][cC][rR][iI][pP][tT]\b[^>]*>.*?</[sS][cC][rR][iI][pP][tT]\s*>";

static SCRIPT_ELEMENT: OnceLock<Regex> = OnceLock::new();

fn script_element() -> &'static Regex {
    SCRIPT_ELEMENT.get_or_init(|| Regex::new(SCRIPT_PATTERN).expect("valid script element regex"))
}

/// Remove `<script>` elements, leaving all other markup untouched.
///
/// An opening tag without a matching close tag is left as literal text.
pub fn sanitize_html(markup: &str) -> String {
    script_element().replace_all(markup, "").into_owned()
}
