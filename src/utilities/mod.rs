//! Native utility implementations: the baseline behind every utility call.
//!
//! The compiled module provides the same three operations; when it is
//! unavailable (or misbehaves on a call) these answer instead. Both paths
//! honour the same contracts.
//!
//! - `reading_time.rs`: whitespace word count, 200 wpm, rounded up
//! - `sanitize.rs`: `<script>` element denylist
//! - `hash.rs`: SHA-256 lowercase hex
//! - `error.rs`: UtilityError

pub mod error;
pub mod hash;
pub mod reading_time;
pub mod sanitize;

pub use error::UtilityError;
pub use hash::{is_digest_hex, sha256_hex, DIGEST_HEX_LEN};
pub use reading_time::{estimate_reading_time, WORDS_PER_MINUTE};
pub use sanitize::sanitize_html;
