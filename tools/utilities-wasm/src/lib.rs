//! Compiled utilities component.
//!
//! Build: cargo build --manifest-path tools/utilities-wasm/Cargo.toml \
//!   --target wasm32-wasip2 --release
//! then copy the .wasm to the theme's `assets/js/dist/sinople_utils.wasm`.

use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};

wit_bindgen::generate!({
    path: "../../wit",
    world: "utilities",
});

const WORDS_PER_MINUTE: usize = 200;

// Tag name matched as ASCII only; `(?i)` would also fold `ſ` to `s`.
const SCRIPT_PATTERN: &str =
    r"(?s)<[sS][cC][rR][iI][pP][tT]\b[^>]*>.*?</[sS][cC][rR][iI][pP][tT]\s*>";

static SCRIPT_ELEMENT: OnceLock<Regex> = OnceLock::new();

struct SinopleUtilities;

impl Guest for SinopleUtilities {
    fn estimate_reading_time(content: String) -> u32 {
        let words = content.split_whitespace().count();
        u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
    }

    fn sanitize_html(markup: String) -> String {
        let re = SCRIPT_ELEMENT.get_or_init(|| {
            Regex::new(SCRIPT_PATTERN).expect("valid script element regex")
        });
        re.replace_all(&markup, "").into_owned()
    }

    fn hash_password(password: String) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }
}

export!(SinopleUtilities);
