//! Chunking: split extracted text into overlapping fixed-size windows.
//!
//! Windows are measured in characters, not bytes, so multi-byte text never
//! splits inside a code point. Consecutive windows overlap so a clause that
//! straddles a window boundary still appears whole in at least one window —
//! a finding sitting exactly on a cut would otherwise be invisible to both
//! sides.

/// Split `text` into windows of at most `max_chars` characters, with
/// consecutive windows overlapping by `overlap` characters.
///
/// Leading and trailing whitespace is stripped first; empty input produces
/// an empty vec, not an error. Chunking stops at the window that reaches the
/// end of the text, so there is never a trailing empty chunk. The window
/// advances at least one character per step even when `overlap >= max_chars`.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < n {
        let end = usize::min(start + max_chars, n);
        chunks.push(chars[start..end].iter().collect());
        if end == n {
            break;
        }
        start = usize::max(end.saturating_sub(overlap), start + 1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_no_chunks() {
        assert!(chunk_text("", 7000, 400).is_empty());
        assert!(chunk_text("   \n\t  ", 7000, 400).is_empty());
    }

    #[test]
    fn short_input_is_one_trimmed_chunk() {
        let chunks = chunk_text("  hello world  ", 7000, 400);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn covers_long_text_with_exact_overlap() {
        let text = "abcdefghij".repeat(1500);
        assert_eq!(text.len(), 15000);

        let chunks = chunk_text(&text, 7000, 400);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 7000);
        assert_eq!(chunks[1].len(), 7000);
        assert_eq!(chunks[2].len(), 1800);

        // Adjacent chunks share exactly 400 characters.
        assert_eq!(&chunks[0][6600..], &chunks[1][..400]);
        assert_eq!(&chunks[1][6600..], &chunks[2][..400]);

        // Dropping each successor's overlap reconstructs the original.
        let rebuilt = format!("{}{}{}", chunks[0], &chunks[1][400..], &chunks[2][400..]);
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn no_trailing_empty_chunk_on_exact_boundary() {
        let text = "x".repeat(7000);
        let chunks = chunk_text(&text, 7000, 400);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 7000);
    }

    #[test]
    fn overlap_larger_than_window_still_terminates() {
        let chunks = chunk_text("abcdef", 2, 5);
        assert!(chunks.len() <= 6);
        assert_eq!(chunks.first().map(String::as_str), Some("ab"));
        assert!(chunks.last().is_some_and(|c| c.ends_with('f')));
        for c in &chunks {
            assert!(c.chars().count() <= 2);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "é".repeat(10);
        let chunks = chunk_text(&text, 4, 1);
        for c in &chunks {
            assert!(c.chars().count() <= 4);
            assert!(c.chars().all(|ch| ch == 'é'));
        }
        let total: usize = chunks.iter().map(|c| c.chars().count()).sum();
        assert!(total >= 10);
    }
}
