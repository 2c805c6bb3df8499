//! Size estimation for memory contents.
//!
//! Sizes are approximate token counts: one token per four characters,
//! rounded up. The estimate is additive over pieces, which is what lets
//! compaction reason about how much room a summary may take.

use crate::conversation::entities::Turn;

const CHARS_PER_TOKEN: usize = 4;

/// Estimated token count of a piece of text.
///
/// # Examples
///
/// ```
/// use palaver_domain::memory::size::estimate_tokens;
///
/// assert_eq!(estimate_tokens(""), 0);
/// assert_eq!(estimate_tokens("abcd"), 1);
/// assert_eq!(estimate_tokens("abcde"), 2);
/// ```
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Estimated token count of a turn as it appears in the prompt context.
pub fn estimate_turn(turn: &Turn) -> usize {
    estimate_tokens(&turn.render())
}

/// Cut `text` so that its estimate fits in `max_tokens`.
///
/// Cuts on a character boundary and trims trailing whitespace left by the
/// cut.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> &str {
    truncate_to_chars(text, max_tokens.saturating_mul(CHARS_PER_TOKEN))
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_to_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end(),
        None => text,
    }
}

/// Copy of `turn` whose rendered line fits in `max_tokens`.
///
/// Returns the turn unchanged when it already fits.
pub fn fit_turn(turn: &Turn, max_tokens: usize) -> Turn {
    if estimate_turn(turn) <= max_tokens {
        return turn.clone();
    }
    let prefix_chars = turn.render().chars().count() - turn.content().chars().count();
    let max_chars = max_tokens
        .saturating_mul(CHARS_PER_TOKEN)
        .saturating_sub(prefix_chars);
    turn.with_content(truncate_to_chars(turn.content(), max_chars))
}
