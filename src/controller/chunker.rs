//! Splitting long messages into platform-sized segments.
//!
//! Discord rejects messages over 2000 characters; 1950 leaves a safety
//! margin. Segments prefer whitespace boundaries so words are not split,
//! falling back to a hard cut when a run has no whitespace.

/// Platform message-size ceiling minus safety margin, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1950;

/// Lazily split `text` into segments of at most `limit` characters.
///
/// The iterator is a pure function of its inputs and can be restarted by
/// calling [`chunk`] again. Each step strictly shortens the remainder, so
/// it always terminates.
pub fn chunk(text: &str, limit: usize) -> Chunks<'_> {
    Chunks { rest: text, limit }
}

/// Iterator over message segments. See [`chunk`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    limit: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        if self.limit == 0 {
            // Degenerate limit: emit everything rather than loop forever.
            let out = self.rest;
            self.rest = "";
            return Some(out);
        }

        // Byte offset just past the first `limit` characters, or None when
        // the whole remainder fits.
        let candidate_end = byte_offset_of_char(self.rest, self.limit);
        let Some(candidate_end) = candidate_end else {
            let out = self.rest;
            self.rest = "";
            return Some(out);
        };

        let candidate = &self.rest[..candidate_end];
        let boundary_is_whitespace = self.rest[candidate_end..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace);

        let (segment, rest) = if boundary_is_whitespace {
            // The cut lands exactly on whitespace: take the candidate whole.
            (candidate, &self.rest[candidate_end..])
        } else {
            match candidate.rfind(char::is_whitespace) {
                // Cut back to the last whitespace inside the candidate.
                Some(idx) if idx > 0 => (&candidate[..idx], &self.rest[idx..]),
                // No usable whitespace: hard cut at the limit.
                _ => (candidate, &self.rest[candidate_end..]),
            }
        };

        self.rest = rest.trim_start();
        Some(segment)
    }
}

/// Byte offset of the `n`-th character of `s`, or None when `s` has at most
/// `n` characters.
fn byte_offset_of_char(s: &str, n: usize) -> Option<usize> {
    s.char_indices().nth(n).map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, limit: usize) -> Vec<&str> {
        chunk(text, limit).collect()
    }

    #[test]
    fn test_short_text_is_single_segment() {
        assert_eq!(collect("Hello world", 50), vec!["Hello world"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert_eq!(collect("", 50), Vec::<&str>::new());
    }

    #[test]
    fn test_cut_at_last_space_under_limit() {
        assert_eq!(collect("a b c d e", 5), vec!["a b c", "d e"]);
    }

    #[test]
    fn test_cut_inside_candidate() {
        // Limit lands mid-word; cut back to the space before it.
        assert_eq!(collect("alpha beta gamma", 9), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_hard_cut_without_whitespace() {
        assert_eq!(collect("HelloBeautifulWorld", 10), vec!["HelloBeaut", "ifulWorld"]);
    }

    #[test]
    fn test_segments_never_exceed_limit() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(30);
        for segment in chunk(&text, 37) {
            assert!(segment.chars().count() <= 37, "segment too long: {:?}", segment);
        }
    }

    #[test]
    fn test_rejoin_reconstructs_text() {
        let text = "one two three four five six seven eight nine ten";
        let rejoined = collect(text, 11).join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_limit_counts_chars_not_bytes() {
        // Four two-byte characters; a limit of 2 chars must not panic or
        // split inside a code point.
        assert_eq!(collect("éééé", 2), vec!["éé", "éé"]);
    }

    #[test]
    fn test_multibyte_with_spaces() {
        assert_eq!(collect("café au lait", 7), vec!["café au", "lait"]);
    }

    #[test]
    fn test_restartable() {
        let text = "a b c d e";
        let first: Vec<&str> = chunk(text, 5).collect();
        let second: Vec<&str> = chunk(text, 5).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_limit_emits_everything() {
        assert_eq!(collect("abc", 0), vec!["abc"]);
    }
}
