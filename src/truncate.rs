//! Byte-accurate truncation of text to backend size limits.
//!
//! Limits on the messaging backend are measured in UTF-8 bytes, so trimming
//! has to walk whole characters and stop before the one that would overflow.

/// Trims `text` to at most `max_bytes` bytes without splitting a character.
///
/// Returns the input unchanged if it already fits.
pub fn trim_to_bytes(text: &str, max_bytes: usize) -> &str {
    trim(text, max_bytes, None)
}

/// Trims `text` to at most `max_bytes` bytes and, if given, at most
/// `max_chars` characters. The result is always a prefix of `text` ending on
/// a character boundary.
pub fn trim(text: &str, max_bytes: usize, max_chars: Option<usize>) -> &str {
    if text.len() <= max_bytes && max_chars.map_or(true, |limit| text.len() <= limit) {
        // Byte length bounds character count, so this fits either way.
        return text;
    }

    let mut end = 0;
    for (count, (offset, ch)) in text.char_indices().enumerate() {
        if max_chars.is_some_and(|limit| count >= limit) {
            break;
        }
        let next = offset + ch.len_utf8();
        if next > max_bytes {
            break;
        }
        end = next;
    }
    &text[..end]
}
