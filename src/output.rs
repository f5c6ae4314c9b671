//! Terminal output formatting.
//!
//! All user-facing text is built by pure `format_*` functions that return
//! strings, with thin `print_*` wrappers doing the actual I/O. Tests
//! assert on the formatted strings; nothing else in the crate prints.

use crate::render::RenderedPage;
use std::path::Path;

/// One line per written page: `name → relative/output/path`.
pub fn format_page_listing(pages: &[RenderedPage]) -> String {
    let width = pages.iter().map(|p| p.name.len()).max().unwrap_or(0);
    pages
        .iter()
        .map(|p| {
            format!(
                "  {:width$} → {}",
                p.name,
                p.output.display(),
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Closing summary line for a finished build.
pub fn format_build_summary(page_count: usize, dist: &Path) -> String {
    let pages = if page_count == 1 { "page" } else { "pages" };
    format!("Built {page_count} {pages} into {}", dist.display())
}

pub fn format_serve_banner(addr: &str, dist: &Path) -> String {
    format!("Serving {} at http://{addr}", dist.display())
}

pub fn format_rebuild_failure(err: &dyn std::fmt::Display) -> String {
    format!("Rebuild failed: {err}")
}

/// Listing for `init`: one created file per line.
pub fn format_init_listing(files: &[std::path::PathBuf]) -> String {
    files
        .iter()
        .map(|f| format!("  created {}", f.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_created_post(path: &Path) -> String {
    format!("Created {}", path.display())
}

pub fn print_build_report(pages: &[RenderedPage], dist: &Path) {
    if !pages.is_empty() {
        println!("{}", format_page_listing(pages));
    }
    println!("{}", format_build_summary(pages.len(), dist));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn page(name: &str, output: &str) -> RenderedPage {
        RenderedPage {
            name: name.to_string(),
            output: PathBuf::from(output),
        }
    }

    #[test]
    fn listing_aligns_names() {
        let pages = vec![
            page("home", "index.html"),
            page("hello-world", "hello-world/index.html"),
        ];
        let listing = format_page_listing(&pages);
        assert_eq!(
            listing,
            "  home        → index.html\n  hello-world → hello-world/index.html"
        );
    }

    #[test]
    fn listing_of_nothing_is_empty() {
        assert_eq!(format_page_listing(&[]), "");
    }

    #[test]
    fn summary_pluralizes() {
        let dist = Path::new("dist");
        assert_eq!(format_build_summary(1, dist), "Built 1 page into dist");
        assert_eq!(format_build_summary(4, dist), "Built 4 pages into dist");
    }

    #[test]
    fn serve_banner_names_the_address() {
        let banner = format_serve_banner("127.0.0.1:3000", Path::new("dist"));
        assert_eq!(banner, "Serving dist at http://127.0.0.1:3000");
    }
}
