//! Conservative output minification.
//!
//! Every generated page and copied stylesheet passes through here before
//! hitting disk. The transforms are deliberately cautious: they only remove
//! bytes that cannot change how a browser interprets the file. Content
//! types without a safe transform pass through untouched, so the asset
//! pipeline can feed everything it copies through the same entry point.
//!
//! HTML preserves `pre`, `textarea`, `script`, and `style` blocks verbatim;
//! whitespace inside them is meaningful. JavaScript only loses trailing
//! whitespace and blank lines, since anything smarter needs a real parser.

use std::path::Path;

/// Minify `input` according to its MIME content type.
pub fn minify(content_type: &str, input: &str) -> String {
    match content_type {
        "text/html" => minify_html(input),
        "text/css" => minify_css(input),
        "text/javascript" | "application/javascript" => minify_js(input),
        _ => input.to_string(),
    }
}

/// Content type for an asset file, judged by extension. `None` means the
/// file has no safe transform and should be copied byte-for-byte.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "css" => Some("text/css"),
        "js" => Some("text/javascript"),
        "html" => Some("text/html"),
        _ => None,
    }
}

const PROTECTED_TAGS: [&str; 4] = ["pre", "textarea", "script", "style"];

/// Tags whose boundaries never separate words. Whitespace between two of
/// these can be dropped; anywhere else a newline may be a softbreak
/// between inline elements and must survive as a space.
const BLOCK_TAGS: [&str; 40] = [
    "html", "head", "body", "title", "meta", "link", "article", "section", "header", "footer",
    "main", "nav", "aside", "div", "p", "ul", "ol", "li", "dl", "dt", "dd", "table", "thead",
    "tbody", "tfoot", "tr", "td", "th", "blockquote", "figure", "figcaption", "form", "fieldset",
    "hr", "h1", "h2", "h3", "h4", "h5", "h6",
];

fn minify_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(p) => &after[p + 3..],
                None => "",
            };
            continue;
        }
        if let Some(tag) = PROTECTED_TAGS.iter().find(|t| opens_tag(rest, t)) {
            let stop = protected_end(rest, tag);
            out.push_str(&rest[..stop]);
            rest = &rest[stop..];
            continue;
        }
        let run_end = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        if run_end > 0 {
            let run = &rest[..run_end];
            rest = &rest[run_end..];
            let between_blocks =
                out.ends_with('>') && rest.starts_with('<') && block_boundary(&out, rest);
            let at_edge = out.is_empty() || rest.is_empty();
            if run.contains('\n') && (between_blocks || at_edge) {
                // Indentation between block tags carries no meaning.
            } else {
                out.push(' ');
            }
            continue;
        }
        let mut chars = rest.char_indices();
        chars.next();
        let next = chars.next().map(|(i, _)| i).unwrap_or(rest.len());
        out.push_str(&rest[..next]);
        rest = &rest[next..];
    }
    out
}

/// Is the tag just closed in `out` and the tag about to open in `rest`
/// both block-level? Only called when `out` ends with `>` and `rest`
/// starts with `<`.
fn block_boundary(out: &str, rest: &str) -> bool {
    let Some(open) = out.rfind('<') else {
        return false;
    };
    is_block_tag(&out[open + 1..]) && is_block_tag(&rest[1..])
}

/// `raw` is tag innards starting at the name, `/` and `!` prefixes
/// included. Doctype and comment markers count as block.
fn is_block_tag(raw: &str) -> bool {
    let raw = raw.strip_prefix('/').unwrap_or(raw);
    if raw.starts_with('!') {
        return true;
    }
    let end = raw
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(raw.len());
    let name = &raw[..end];
    BLOCK_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

/// Does `rest` start with an opening `<tag ...>` for the given tag name?
fn opens_tag(rest: &str, tag: &str) -> bool {
    let Some(after) = rest.strip_prefix('<') else {
        return false;
    };
    let Some(head) = after.get(..tag.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(tag) {
        return false;
    }
    matches!(
        after[tag.len()..].chars().next(),
        Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('\r') | Some('/')
    )
}

/// Byte offset just past the matching `</tag>`, or the end of input when
/// the element is never closed.
fn protected_end(rest: &str, tag: &str) -> usize {
    let close = format!("</{tag}");
    let lower = rest.to_ascii_lowercase();
    match lower.find(&close) {
        Some(p) => match rest[p..].find('>') {
            Some(q) => p + q + 1,
            None => rest.len(),
        },
        None => rest.len(),
    }
}

fn minify_css(input: &str) -> String {
    // Pass 1: drop comments, collapse whitespace, skip string literals.
    let mut collapsed = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut pending_space = false;
    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                if pending_space && !collapsed.is_empty() {
                    collapsed.push(' ');
                }
                pending_space = false;
                collapsed.push(ch);
                let mut escaped = false;
                for c in chars.by_ref() {
                    collapsed.push(c);
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == ch {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                if pending_space && !collapsed.is_empty() {
                    collapsed.push(' ');
                }
                pending_space = false;
                collapsed.push(c);
            }
        }
    }

    // Pass 2: spaces around structural punctuation are noise.
    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ' ' {
            if matches!(chars.peek(), Some('{' | '}' | ';' | ',' | '>' | ')')) {
                continue;
            }
            out.push(' ');
        } else {
            out.push(ch);
            if matches!(ch, '{' | '}' | ';' | ',' | ':' | '>' | '(') && chars.peek() == Some(&' ')
            {
                chars.next();
            }
        }
    }
    out
}

fn minify_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for line in input.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    out
}
