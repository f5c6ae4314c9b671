//! Pre-order rendering of the tree into the dist directory.
//!
//! Each node becomes one `index.html`, mirroring its web path on disk:
//!
//! ```text
//! node                     output
//! ----------------------   ---------------------------
//! root                     <dist>/index.html
//! notes/                   <dist>/notes/index.html
//! notes/2020-01-01-a.md    <dist>/notes/a/index.html
//! ```
//!
//! Every page is a directory index, so generated links need no `.html`
//! suffix and match [`Tree::path`] exactly.
//!
//! The walk is all-or-nothing: the first failed template or write aborts
//! it. There is no partial-success mode — a site with holes is worse than
//! a loud failed build.

use crate::minify;
use crate::templates::{TemplateError, Templater};
use crate::tree::{NodeId, Tree};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

/// One written page, for the build listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Node name (`home` for the root page).
    pub name: String,
    /// Output path relative to the dist directory.
    pub output: PathBuf,
}

/// Render the whole tree under `dist`, pre-order, children in their
/// current (sorted) order. Returns the pages written, in walk order.
pub fn render_site(
    tree: &Arc<Tree>,
    templater: &Templater,
    dist: &Path,
) -> Result<Vec<RenderedPage>, RenderError> {
    let mut pages = Vec::new();
    render_subtree(tree, templater, dist, tree.root(), &mut pages)?;
    Ok(pages)
}

fn render_subtree(
    tree: &Arc<Tree>,
    templater: &Templater,
    dist: &Path,
    id: NodeId,
    pages: &mut Vec<RenderedPage>,
) -> Result<(), RenderError> {
    let rel = output_dir(tree, id);
    let dir = dist.join(&rel);
    std::fs::create_dir_all(&dir).map_err(|source| RenderError::Write {
        path: dir.clone(),
        source,
    })?;

    let html = templater.render_node(tree, id)?;
    let minified = minify::minify("text/html", &html);
    let out = dir.join("index.html");
    std::fs::write(&out, minified).map_err(|source| RenderError::Write {
        path: out.clone(),
        source,
    })?;
    pages.push(RenderedPage {
        name: tree.name(id).to_string(),
        output: rel.join("index.html"),
    });

    for &child in tree.children(id) {
        render_subtree(tree, templater, dist, child, pages)?;
    }
    Ok(())
}

/// Directory the node's `index.html` lands in, relative to dist.
fn output_dir(tree: &Arc<Tree>, id: NodeId) -> PathBuf {
    if tree.is_leaf(id) {
        let parent = tree.source_path(id).parent().unwrap_or(Path::new(""));
        parent.join(tree.name(id))
    } else {
        tree.source_path(id).to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SiteOptions, SortDirection};
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> (TempDir, Arc<Tree>) {
        let tmp = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
        }
        let mut tree = Tree::build(tmp.path(), SiteOptions::default()).unwrap();
        tree.sort_by_date(SortDirection::Descending);
        (tmp, Arc::new(tree))
    }

    fn templater(templates: &[(&str, &str)]) -> (TempDir, Templater) {
        let tmp = TempDir::new().unwrap();
        for (name, body) in templates {
            fs::write(tmp.path().join(name), body).unwrap();
        }
        let meta = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        let t = Templater::new(tmp.path(), &meta, "/");
        (tmp, t)
    }

    fn minimal_theme() -> (TempDir, Templater) {
        templater(&[
            ("dir.html", "<main>{{ node.title }}</main>"),
            ("file.html", "<article>{{ render(node.content()) }}</article>"),
        ])
    }

    #[test]
    fn writes_one_index_html_per_node() {
        let (_docs, tree) = tree(&[
            ("2023-01-01-hello.md", "# Hello"),
            ("notes/2020-01-01-a.md", "# A"),
        ]);
        let (_theme, t) = minimal_theme();
        let dist = TempDir::new().unwrap();

        let pages = render_site(&tree, &t, dist.path()).unwrap();

        assert_eq!(pages.len(), 4);
        assert!(dist.path().join("index.html").is_file());
        assert!(dist.path().join("hello/index.html").is_file());
        assert!(dist.path().join("notes/index.html").is_file());
        assert!(dist.path().join("notes/a/index.html").is_file());
    }

    #[test]
    fn listing_follows_walk_order() {
        let (_docs, tree) = tree(&[
            ("2023-01-01-hello.md", "x"),
            ("notes/2020-01-01-a.md", "y"),
        ]);
        let (_theme, t) = minimal_theme();
        let dist = TempDir::new().unwrap();

        let pages = render_site(&tree, &t, dist.path()).unwrap();
        let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
        // Descending sort: hello (2023) before notes (2020 via descendant).
        assert_eq!(names, vec!["home", "hello", "notes", "a"]);
        assert_eq!(pages[0].output, PathBuf::from("index.html"));
        assert_eq!(pages[3].output, PathBuf::from("notes/a/index.html"));
    }

    #[test]
    fn leaf_output_strips_the_date_prefix() {
        let (_docs, tree) = tree(&[("2022-05-05-some-post.md", "x")]);
        let (_theme, t) = minimal_theme();
        let dist = TempDir::new().unwrap();

        render_site(&tree, &t, dist.path()).unwrap();
        assert!(dist.path().join("some-post/index.html").is_file());
        assert!(!dist.path().join("2022-05-05-some-post/index.html").exists());
    }

    #[test]
    fn output_is_minified() {
        let (_docs, tree) = tree(&[("2023-01-01-a.md", "body")]);
        let (_theme, t) = templater(&[
            ("dir.html", "<div>\n  <p>{{ node.title }}</p>\n</div>\n"),
            ("file.html", "<div>\n  <p>{{ node.title }}</p>\n</div>\n"),
        ]);
        let dist = TempDir::new().unwrap();

        render_site(&tree, &t, dist.path()).unwrap();
        let html = fs::read_to_string(dist.path().join("a/index.html")).unwrap();
        assert_eq!(html, "<div><p>A</p></div>");
    }

    #[test]
    fn rendered_content_reaches_the_page() {
        let (_docs, tree) = tree(&[("2023-01-01-post.md", "# Post\n\nHello there.\n")]);
        let (_theme, t) = minimal_theme();
        let dist = TempDir::new().unwrap();

        render_site(&tree, &t, dist.path()).unwrap();
        let html = fs::read_to_string(dist.path().join("post/index.html")).unwrap();
        assert!(html.contains("<h1"), "{html}");
        assert!(html.contains("Hello there."), "{html}");
    }

    #[test]
    fn first_failure_aborts_the_walk() {
        // dir.html exists but file.html does not: the root renders, the
        // first leaf fails, and no leaf output appears.
        let (_docs, tree) = tree(&[("2023-01-01-a.md", "x")]);
        let (_theme, t) = templater(&[("dir.html", "<main></main>")]);
        let dist = TempDir::new().unwrap();

        let err = render_site(&tree, &t, dist.path()).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
        assert!(!dist.path().join("a/index.html").exists());
    }
}
