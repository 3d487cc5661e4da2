//! Whitespace normalization and paragraph splitting.

/// Collapse every run of whitespace (newlines included) into one space and trim.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into paragraphs separated by blank lines.
///
/// A line holding only whitespace counts as blank. Pieces are trimmed and
/// empty pieces dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            push_paragraph(&mut paragraphs, &mut current);
        } else {
            current.push(line);
        }
    }
    push_paragraph(&mut paragraphs, &mut current);
    paragraphs
}

fn push_paragraph(paragraphs: &mut Vec<String>, current: &mut Vec<&str>) {
    let joined = current.join("\n");
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  a \n\n b\t\tc  "), "a b c");
        assert_eq!(normalize("line one\r\nline two"), "line one line two");
    }

    #[test]
    fn normalize_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("x  y\n z");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "First para\nstill first.\n\n  \nSecond para.\n\n\nThird.";
        assert_eq!(
            split_paragraphs(text),
            vec!["First para\nstill first.", "Second para.", "Third."]
        );
    }

    #[test]
    fn paragraphs_single_newline_is_not_a_break() {
        assert_eq!(split_paragraphs("a\nb"), vec!["a\nb"]);
    }

    #[test]
    fn paragraphs_of_blank_text() {
        assert!(split_paragraphs("\n \n\t\n").is_empty());
        assert!(split_paragraphs("").is_empty());
    }
}
