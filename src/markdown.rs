//! Markdown conversion for templates.
//!
//! Three views over the same document text, each exposed to themes as a
//! template function:
//!
//! - [`render`]: the full document as HTML, with stable `id` anchors
//!   injected into every heading
//! - [`toc`]: a nested `<ul>` outline of the headings nested under the
//!   document's first heading, linking to those anchors
//! - [`excerpt`]: just the first top-level paragraph, for directory listings
//!
//! All three parse with the same extension set (tables, footnotes,
//! strikethrough, task lists), so anchors produced by [`render`] always
//! match the links produced by [`toc`].

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Convert a Markdown document to HTML.
///
/// Headings without an explicit `{#id}` attribute get one derived from
/// their text, so in-page links and the table of contents can target them.
pub fn render(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let events = with_heading_ids(Parser::new_ext(text, options()).collect());
    html::push_html(&mut out, events.into_iter());
    out
}

/// Inject slug ids into headings that do not already carry one.
fn with_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();
    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                // Buffer the heading body so its text can name the anchor.
                let mut body = Vec::new();
                for inner in iter.by_ref() {
                    if matches!(inner, Event::End(TagEnd::Heading(_))) {
                        break;
                    }
                    body.push(inner);
                }
                let id = id.or_else(|| {
                    let slug = slugify(&plain_text(&body));
                    (!slug.is_empty()).then(|| CowStr::from(slug))
                });
                out.push(Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }));
                out.extend(body);
                out.push(Event::End(TagEnd::Heading(level)));
            }
            other => out.push(other),
        }
    }
    out
}

/// Render a nested `<ul>` outline of the document's headings.
///
/// The first heading is treated as the document title and excluded; the
/// outline covers the headings that follow it at deeper levels, stopping
/// at the next heading of the title's level or shallower. Documents with
/// no such structure produce an empty string.
pub fn toc(text: &str) -> String {
    let headings = collect_headings(text);
    let Some((first, rest)) = headings.split_first() else {
        return String::new();
    };
    let root_level = first.0;
    let items: Vec<_> = rest
        .iter()
        .take_while(|(level, _, _)| *level > root_level)
        .map(|(level, text, slug)| (*level - root_level, text, slug))
        .collect();
    if items.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut depth = 0usize;
    for (d, text, slug) in items {
        // A document may skip levels (`#` straight to `###`); nesting
        // still only deepens one list at a time or the markup goes bad.
        let d = d.min(depth + 1);
        if d > depth {
            for _ in depth..d {
                out.push_str("<ul>");
            }
        } else {
            out.push_str("</li>");
            for _ in d..depth {
                out.push_str("</ul></li>");
            }
        }
        depth = d;
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            slug,
            escape_text(text)
        ));
    }
    out.push_str("</li>");
    for _ in 1..depth {
        out.push_str("</ul></li>");
    }
    out.push_str("</ul>");
    out
}

/// All headings in order as `(level, text, slug)`.
fn collect_headings(text: &str) -> Vec<(usize, String, String)> {
    let mut headings = Vec::new();
    let mut current: Option<(usize, Option<String>, Vec<Event<'_>>)> = None;
    for event in Parser::new_ext(text, options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((level as usize, id.map(|i| i.to_string()), Vec::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, id, body)) = current.take() {
                    let text = plain_text(&body);
                    let slug = id.unwrap_or_else(|| slugify(&text));
                    headings.push((level, text, slug));
                }
            }
            other => {
                if let Some((_, _, body)) = current.as_mut() {
                    body.push(other);
                }
            }
        }
    }
    headings
}

/// Render only the first top-level paragraph of the document.
///
/// Paragraphs nested inside lists, quotes, or footnotes do not count; a
/// document opening with a heading still yields its first paragraph.
/// Documents with no top-level paragraph produce an empty string.
pub fn excerpt(text: &str) -> String {
    let mut container_depth = 0usize;
    let mut paragraph: Vec<Event<'_>> = Vec::new();
    let mut in_paragraph = false;
    for event in Parser::new_ext(text, options()) {
        match &event {
            Event::Start(Tag::Paragraph) if container_depth == 0 && !in_paragraph => {
                in_paragraph = true;
                paragraph.push(event);
            }
            Event::End(TagEnd::Paragraph) if in_paragraph => {
                paragraph.push(event);
                break;
            }
            Event::Start(
                Tag::BlockQuote(_) | Tag::List(_) | Tag::Item | Tag::FootnoteDefinition(_),
            ) if !in_paragraph => {
                container_depth += 1;
            }
            Event::End(
                TagEnd::BlockQuote(_) | TagEnd::List(_) | TagEnd::Item | TagEnd::FootnoteDefinition,
            ) if !in_paragraph => {
                container_depth = container_depth.saturating_sub(1);
            }
            _ => {
                if in_paragraph {
                    paragraph.push(event);
                }
            }
        }
    }
    if paragraph.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    html::push_html(&mut out, paragraph.into_iter());
    out
}

/// Concatenated text content of a run of inline events.
fn plain_text(events: &[Event<'_>]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(t),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            _ => {}
        }
    }
    out
}

/// Lowercase, alphanumerics kept, everything else collapsed to single
/// dashes. Matches what readers expect from heading anchors.
fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // render
    // =========================================================================

    #[test]
    fn renders_basic_markdown() {
        let html = render("# Hello\n\nSome *emphasis*.\n");
        assert!(html.contains("<h1"), "{html}");
        assert!(html.contains("Hello"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn headings_get_slug_ids() {
        let html = render("## My Section Title\n");
        assert!(html.contains("id=\"my-section-title\""), "{html}");
    }

    #[test]
    fn explicit_heading_ids_are_kept() {
        let html = render("## Custom {#custom-anchor}\n");
        assert!(html.contains("id=\"custom-anchor\""), "{html}");
        assert!(!html.contains("id=\"custom\""), "{html}");
    }

    #[test]
    fn heading_id_strips_punctuation() {
        let html = render("## What's New?\n");
        assert!(html.contains("id=\"what-s-new\""), "{html}");
    }

    #[test]
    fn tables_are_enabled() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"), "{html}");
    }

    #[test]
    fn strikethrough_is_enabled() {
        let html = render("~~gone~~\n");
        assert!(html.contains("<del>gone</del>"), "{html}");
    }

    #[test]
    fn fenced_code_keeps_language_class() {
        let html = render("```rust\nfn main() {}\n```\n");
        assert!(html.contains("language-rust"), "{html}");
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render(""), "");
    }

    // =========================================================================
    // toc
    // =========================================================================

    #[test]
    fn toc_lists_headings_under_the_title() {
        let toc = toc("# Title\n\n## One\n\n## Two\n");
        assert_eq!(
            toc,
            "<ul><li><a href=\"#one\">One</a></li><li><a href=\"#two\">Two</a></li></ul>"
        );
    }

    #[test]
    fn toc_nests_deeper_levels() {
        let toc = toc("# Title\n\n## One\n\n### One A\n\n## Two\n");
        assert!(toc.contains("<ul><li><a href=\"#one\">One</a><ul>"), "{toc}");
        assert!(toc.contains("<a href=\"#one-a\">One A</a>"), "{toc}");
        assert!(toc.contains("</ul></li><li><a href=\"#two\">Two</a></li></ul>"), "{toc}");
    }

    #[test]
    fn toc_stops_at_the_next_title_level_heading() {
        let toc = toc("# Title\n\n## One\n\n# Another Document Part\n\n## Ignored\n");
        assert!(toc.contains("#one"), "{toc}");
        assert!(!toc.contains("Ignored"), "{toc}");
    }

    #[test]
    fn toc_clamps_a_skipped_heading_level() {
        // `#` straight to `###`: the outline nests one level, not two.
        let toc = toc("# Title\n\n### Deep\n\n## Shallow\n");
        assert_eq!(
            toc,
            "<ul><li><a href=\"#deep\">Deep</a></li>\
             <li><a href=\"#shallow\">Shallow</a></li></ul>"
        );
    }

    #[test]
    fn toc_with_skipped_level_stays_well_formed() {
        let toc = toc("# Title\n\n## One\n\n#### Very Deep\n\n## Two\n");
        assert_eq!(
            toc,
            "<ul><li><a href=\"#one\">One</a>\
             <ul><li><a href=\"#very-deep\">Very Deep</a></li></ul></li>\
             <li><a href=\"#two\">Two</a></li></ul>"
        );
    }

    #[test]
    fn toc_of_flat_document_is_empty() {
        assert_eq!(toc("# Only A Title\n\nBody text.\n"), "");
    }

    #[test]
    fn toc_of_headingless_document_is_empty() {
        assert_eq!(toc("Just a paragraph.\n"), "");
    }

    #[test]
    fn toc_links_match_rendered_anchors() {
        let text = "# Doc\n\n## What's New?\n";
        let toc = toc(text);
        let html = render(text);
        assert!(toc.contains("href=\"#what-s-new\""), "{toc}");
        assert!(html.contains("id=\"what-s-new\""), "{html}");
    }

    // =========================================================================
    // excerpt
    // =========================================================================

    #[test]
    fn excerpt_is_the_first_paragraph() {
        let html = excerpt("First paragraph here.\n\nSecond paragraph.\n");
        assert_eq!(html.trim(), "<p>First paragraph here.</p>");
    }

    #[test]
    fn excerpt_skips_a_leading_heading() {
        let html = excerpt("# Title\n\nThe opening line.\n\nMore.\n");
        assert_eq!(html.trim(), "<p>The opening line.</p>");
    }

    #[test]
    fn excerpt_keeps_inline_markup() {
        let html = excerpt("Some *styled* opening.\n");
        assert_eq!(html.trim(), "<p>Some <em>styled</em> opening.</p>");
    }

    #[test]
    fn excerpt_ignores_paragraphs_inside_lists() {
        let html = excerpt("- item one\n- item two\n\nReal paragraph.\n");
        assert_eq!(html.trim(), "<p>Real paragraph.</p>");
    }

    #[test]
    fn excerpt_of_empty_document_is_empty() {
        assert_eq!(excerpt(""), "");
        assert_eq!(excerpt("# Heading only\n"), "");
    }
}
