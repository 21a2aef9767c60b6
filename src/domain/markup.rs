//! Markup stripping for plain-text mail fields.

/// Remove tags, comments, declarations and processing instructions.
///
/// Text between tags is kept as-is (no whitespace folding, no entity decoding).
/// A `<` that cannot open a tag, as in `a < b`, is kept literally. Quoted
/// attribute values may contain `>`.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match tag_len(candidate) {
            Some(len) => rest = &candidate[len..],
            None if opens_tag(candidate) => {
                // Unterminated tag swallows the remainder.
                rest = "";
            }
            None => {
                out.push('<');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn opens_tag(s: &str) -> bool {
    matches!(
        s[1..].chars().next(),
        Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?'
    )
}

/// Byte length of the construct starting at `s` (which begins with `<`), or
/// `None` when it is not a complete tag.
fn tag_len(s: &str) -> Option<usize> {
    if !opens_tag(s) {
        return None;
    }
    if let Some(comment) = s.strip_prefix("<!--") {
        // `<!-->` and `<!--->` are complete (empty) comments.
        if comment.starts_with('>') {
            return Some(5);
        }
        if comment.starts_with("->") {
            return Some(6);
        }
        return comment.find("-->").map(|end| 4 + end + 3);
    }
    if s.starts_with("<?") {
        return s[2..].find("?>").map(|end| 2 + end + 2);
    }

    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            (None, _) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_simple() {
        assert_eq!(strip_tags("<b>Hi</b>"), "Hi");
    }

    #[test]
    fn test_strip_nested_keeps_spacing() {
        assert_eq!(
            strip_tags("<div><b>Bold</b>  and <i>italic</i></div>\n"),
            "Bold  and italic\n"
        );
    }

    #[test]
    fn test_strip_quoted_gt_in_attribute() {
        assert_eq!(
            strip_tags(r#"<a href="x" title="a > b">Link</a>"#),
            "Link"
        );
    }

    #[test]
    fn test_strip_comments_and_declarations() {
        assert_eq!(
            strip_tags("<!DOCTYPE html><!-- <b>hidden</b> -->Shown<?php echo 1; ?>"),
            "Shown"
        );
    }

    #[test]
    fn test_empty_comments_close() {
        assert_eq!(strip_tags("<!-->after"), "after");
        assert_eq!(strip_tags("a<!--->b"), "ab");
        assert_eq!(strip_tags("<!---->c"), "c");
    }

    #[test]
    fn test_literal_less_than_kept() {
        assert_eq!(strip_tags("1 < 2 and 3 <= 4"), "1 < 2 and 3 <= 4");
    }

    #[test]
    fn test_unterminated_tag_dropped() {
        assert_eq!(strip_tags("Hello <b class=\"x"), "Hello ");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_tags("Nothing to see, café"), "Nothing to see, café");
    }
}
