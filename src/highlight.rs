//! Code-block stylesheet generation.
//!
//! Fenced code blocks come out of the markdown engine as
//! `<pre><code class="language-...">`. This module turns a named style into
//! a small stylesheet targeting those blocks, written once per build to
//! `assets/highlight.css`. Styles are block-level palettes (background,
//! foreground, accent for inline code), not token-level highlighting.
//!
//! Unknown style names fall back to the default rather than failing the
//! build; a typo in `--style` should not block publishing.

/// The style used when none is requested or the requested name is unknown.
pub const DEFAULT_STYLE: &str = "dracula";

/// Color palette for code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub name: &'static str,
    background: &'static str,
    foreground: &'static str,
    accent: &'static str,
    border: &'static str,
}

const STYLES: [Style; 5] = [
    Style {
        name: "dracula",
        background: "#282a36",
        foreground: "#f8f8f2",
        accent: "#ff79c6",
        border: "#44475a",
    },
    Style {
        name: "github",
        background: "#f6f8fa",
        foreground: "#1f2328",
        accent: "#0550ae",
        border: "#d1d9e0",
    },
    Style {
        name: "monokai",
        background: "#272822",
        foreground: "#f8f8f2",
        accent: "#a6e22e",
        border: "#49483e",
    },
    Style {
        name: "solarized-light",
        background: "#fdf6e3",
        foreground: "#657b83",
        accent: "#b58900",
        border: "#eee8d5",
    },
    Style {
        name: "nord",
        background: "#2e3440",
        foreground: "#d8dee9",
        accent: "#88c0d0",
        border: "#434c5e",
    },
];

/// Look up a style by name, falling back to [`DEFAULT_STYLE`].
pub fn style(name: &str) -> Style {
    STYLES
        .iter()
        .find(|s| s.name == name)
        .or_else(|| STYLES.iter().find(|s| s.name == DEFAULT_STYLE))
        .copied()
        .unwrap_or(STYLES[0])
}

/// Names of all built-in styles, for CLI help and error messages.
pub fn style_names() -> Vec<&'static str> {
    STYLES.iter().map(|s| s.name).collect()
}

/// Generate the stylesheet for a named style. Not minified; the caller
/// runs it through the same pipeline as every other stylesheet.
pub fn stylesheet(name: &str) -> String {
    let s = style(name);
    format!(
        "/* code style: {name} */\n\
         pre {{\n\
         \x20 background: {bg};\n\
         \x20 color: {fg};\n\
         \x20 border: 1px solid {border};\n\
         \x20 border-radius: 4px;\n\
         \x20 padding: 1em;\n\
         \x20 overflow-x: auto;\n\
         }}\n\
         pre code {{\n\
         \x20 background: none;\n\
         \x20 color: inherit;\n\
         \x20 padding: 0;\n\
         }}\n\
         code {{\n\
         \x20 background: {bg};\n\
         \x20 color: {accent};\n\
         \x20 border-radius: 3px;\n\
         \x20 padding: 0.15em 0.35em;\n\
         \x20 font-size: 0.95em;\n\
         }}\n\
         pre code[class*=\"language-\"] {{\n\
         \x20 display: block;\n\
         }}\n",
        name = s.name,
        bg = s.background,
        fg = s.foreground,
        accent = s.accent,
        border = s.border,
    )
}
