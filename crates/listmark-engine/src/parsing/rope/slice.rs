use xi_rope::Rope;

use super::span::Span;

/// Extracts the text for a span from the rope as an owned String.
///
/// This allocates; prefer working with spans where possible.
pub fn slice_to_string(rope: &Rope, sp: Span) -> String {
    let end = sp.end.min(rope.len());
    let start = sp.start.min(end);
    rope.slice_to_cow(start..end).into_owned()
}

/// Extracts text for a span, truncating to `max` bytes with "..." suffix if needed.
///
/// Used by the CLI's decoration listing.
pub fn preview(text: &str, max: usize) -> String {
    let mut s = text.to_string();
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("...");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_unchanged() {
        assert_eq!(preview("hello", 10), "hello");
    }

    #[test]
    fn preview_truncates_long_text() {
        assert_eq!(preview("hello world", 5), "hello...");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("ééé", 3), "é...");
    }

    #[test]
    fn slice_to_string_clamps() {
        let rope = Rope::from("hello world");
        assert_eq!(slice_to_string(&rope, Span::new(6, 40)), "world");
    }
}
