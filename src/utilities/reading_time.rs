//! Reading-time estimate in whole minutes.

/// Average adult reading speed used for the estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-delimited words and round up to whole minutes.
///
/// Tokenization uses Unicode whitespace only (not locale-aware), so the
/// compiled module and this implementation agree on every input.
/// Empty or whitespace-only content reads in 0 minutes.
pub fn estimate_reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}
