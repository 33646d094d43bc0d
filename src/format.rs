//! Splits reply/query text into prose and code segments for rendering.
//!
//! Two passes: triple-backtick fences first, because everything between a
//! pair of fences is code regardless of inline backticks, then an inline
//! single-backtick scan over the lines that are not inside a fence.

/// A contiguous run of output text tagged as prose or code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub is_code: bool,
}

impl Segment {
    fn new(text: impl Into<String>, is_code: bool) -> Self {
        Self {
            text: text.into(),
            is_code,
        }
    }
}

/// Splits `text` into ordered segments, left-to-right, top-to-bottom.
/// Empty input yields no segments.
pub fn format(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut in_code_block = false;

    for line in text.split('\n') {
        if let Some(rest) = line.strip_prefix("```") {
            in_code_block = !in_code_block;
            // A fence with trailing text becomes a code-styled caption;
            // the fence line itself is dropped from the stream.
            if !rest.is_empty() {
                segments.push(Segment::new(
                    format!("//[[{}]]", line.trim_matches('`')),
                    true,
                ));
            }
            continue;
        }
        if in_code_block {
            segments.push(Segment::new(format!("{}\n", line), true));
        } else {
            scan_inline(line, &mut segments);
        }
    }

    segments
}

/// Scans one non-fenced line for inline code spans. Escaped backticks are
/// unescaped and never open or close a span; an unclosed span runs as code
/// to the end of the line.
fn scan_inline(line: &str, segments: &mut Vec<Segment>) {
    let line = format!("{}\n", line);
    if !line.contains('`') {
        segments.push(Segment::new(line, false));
        return;
    }

    let mut buf = String::new();
    let mut in_span = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'`') {
            buf.push('`');
            chars.next();
            continue;
        }
        if c == '`' {
            if !buf.is_empty() {
                segments.push(Segment::new(std::mem::take(&mut buf), in_span));
            }
            in_span = !in_span;
            continue;
        }
        buf.push(c);
    }
    if !buf.is_empty() {
        segments.push(Segment::new(buf, in_span));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, bool)> {
        format(text)
            .into_iter()
            .map(|s| (s.text, s.is_code))
            .collect()
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(format("").is_empty());
    }

    #[test]
    fn plain_line_is_one_prose_segment() {
        assert_eq!(pairs("hello"), vec![("hello\n".to_string(), false)]);
    }

    #[test]
    fn inline_span_splits_into_three_segments() {
        assert_eq!(
            pairs("plain `code` text"),
            vec![
                ("plain ".to_string(), false),
                ("code".to_string(), true),
                (" text\n".to_string(), false),
            ]
        );
    }

    #[test]
    fn escaped_backticks_never_open_a_span() {
        assert_eq!(
            pairs("a \\`not code\\` b"),
            vec![("a `not code` b\n".to_string(), false)]
        );
    }

    #[test]
    fn unclosed_span_runs_to_end_of_line() {
        assert_eq!(
            pairs("before `rest of line"),
            vec![
                ("before ".to_string(), false),
                ("rest of line\n".to_string(), true),
            ]
        );
    }

    #[test]
    fn fenced_block_is_verbatim_code() {
        assert_eq!(
            pairs("before\n```\nlet `x` = 1;\n```\nafter"),
            vec![
                ("before\n".to_string(), false),
                ("let `x` = 1;\n".to_string(), true),
                ("after\n".to_string(), false),
            ]
        );
    }

    #[test]
    fn fence_label_becomes_code_caption() {
        assert_eq!(
            pairs("```rust\nfn main() {}\n```"),
            vec![
                ("//[[rust]]".to_string(), true),
                ("fn main() {}\n".to_string(), true),
            ]
        );
    }

    #[test]
    fn inline_scan_is_skipped_inside_fences() {
        let segs = pairs("```\na `b` c\n```");
        assert_eq!(segs, vec![("a `b` c\n".to_string(), true)]);
    }

    #[test]
    fn ordering_is_preserved_across_lines() {
        let segs = pairs("one `two`\nthree");
        assert_eq!(
            segs,
            vec![
                ("one ".to_string(), false),
                ("two".to_string(), true),
                ("\n".to_string(), false),
                ("three\n".to_string(), false),
            ]
        );
    }
}
