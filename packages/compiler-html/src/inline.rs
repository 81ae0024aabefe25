//! Inline emphasis for text content: `**bold**`, `*italic*` and `` `code` ``.
//!
//! Only inline constructs are rendered. Anything markdown would treat as a
//! block (list markers, `#` headings) is emitted as the literal source text,
//! and raw HTML in the input is escaped like any other text.

use crate::escape::escape_html;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Render `text` as escaped HTML with emphasis spans
pub fn render_inline(text: &str) -> String {
    if !text.contains(&['*', '_', '`'][..]) {
        return escape_html(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut cursor = 0usize;

    // Source text the parser consumed as markup, e.g. a list marker
    let flush_gap = |out: &mut String, cursor: &mut usize, until: usize| {
        if until > *cursor {
            out.push_str(&escape_html(&text[*cursor..until]));
            *cursor = until;
        }
    };

    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::Strong) => {
                flush_gap(&mut out, &mut cursor, range.start);
                out.push_str("<strong>");
                cursor = range.start + delimiter_len(&text[range.start..], 2);
            }
            Event::Start(Tag::Emphasis) => {
                flush_gap(&mut out, &mut cursor, range.start);
                out.push_str("<em>");
                cursor = range.start + delimiter_len(&text[range.start..], 1);
            }
            Event::End(TagEnd::Strong) => {
                out.push_str("</strong>");
                cursor = cursor.max(range.end);
            }
            Event::End(TagEnd::Emphasis) => {
                out.push_str("</em>");
                cursor = cursor.max(range.end);
            }
            Event::Text(content) => {
                flush_gap(&mut out, &mut cursor, range.start);
                out.push_str(&escape_html(&content));
                cursor = cursor.max(range.end);
            }
            Event::Code(content) => {
                flush_gap(&mut out, &mut cursor, range.start);
                out.push_str("<code>");
                out.push_str(&escape_html(&content));
                out.push_str("</code>");
                cursor = cursor.max(range.end);
            }
            Event::SoftBreak | Event::HardBreak => {
                flush_gap(&mut out, &mut cursor, range.start);
                out.push('\n');
                cursor = cursor.max(range.end);
            }
            Event::Html(_) | Event::InlineHtml(_) => {
                flush_gap(&mut out, &mut cursor, range.end);
            }
            Event::End(_) => {
                // Closing markup of other constructs (link targets, heading
                // closers) is kept literally
                let until = range.end.min(text.len());
                if text[cursor.min(until)..until].trim().is_empty() {
                    cursor = cursor.max(until);
                } else {
                    flush_gap(&mut out, &mut cursor, until);
                }
            }
            _ => {}
        }
    }

    if cursor < text.len() && !text[cursor..].trim().is_empty() {
        out.push_str(&escape_html(&text[cursor..]));
    }
    out.trim_end().to_string()
}

/// Length of the run of `*`/`_` delimiters opening a span, capped at `max`
fn delimiter_len(source: &str, max: usize) -> usize {
    source
        .chars()
        .take_while(|c| *c == '*' || *c == '_')
        .take(max)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_escaped_only() {
        assert_eq!(render_inline("Fish & <Chips>"), "Fish &amp; &lt;Chips&gt;");
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            render_inline("A **bold** and *light* move"),
            "A <strong>bold</strong> and <em>light</em> move"
        );
        assert_eq!(render_inline("__under__"), "<strong>under</strong>");
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            render_inline("***both***"),
            "<em><strong>both</strong></em>"
        );
    }

    #[test]
    fn test_block_markers_kept_literally() {
        assert_eq!(render_inline("1. *First* step"), "1. <em>First</em> step");
        assert_eq!(render_inline("# Not a *heading*"), "# Not a <em>heading</em>");
        assert_eq!(render_inline("- item *one*"), "- item <em>one</em>");
    }

    #[test]
    fn test_html_inside_emphasis_is_escaped() {
        assert_eq!(
            render_inline("*<b>x</b>*"),
            "<em>&lt;b&gt;x&lt;/b&gt;</em>"
        );
    }

    #[test]
    fn test_unbalanced_delimiters_stay_literal() {
        assert_eq!(render_inline("5 * 3 = 15"), "5 * 3 = 15");
        assert_eq!(render_inline("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(render_inline("run `cargo <x>`"), "run <code>cargo &lt;x&gt;</code>");
    }
}
