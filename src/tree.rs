//! Document tree construction and the node model.
//!
//! The tree is the heart of the build pipeline. A single pre-order walk over
//! the docs directory produces one [`Node`] per document or folder, linked
//! into a hierarchy that templates can navigate freely (parent, children,
//! siblings, root).
//!
//! ## Source Layout
//!
//! ```text
//! docs/                            # Walk root → the tree root node
//! ├── 2024-01-01-b.md              # Leaf under root
//! ├── index.md                     # Root body content — never a node
//! └── notes/                       # Directory node
//!     ├── index.md                 # Body content for notes/
//!     └── 2020-01-01-a.md          # Leaf under notes/
//! ```
//!
//! ## Representation
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by
//! [`NodeId`] index. Parent and root links are plain indices, so the cyclic
//! parent/child/root graph needs no reference counting and no lifetimes.
//! Derived attributes (web path, name, title, date) are computed on first
//! access and memoized write-once; everything else on a node is immutable
//! after construction, except the one-time reordering done by
//! [`Tree::sort_by_date`].
//!
//! ## Walk-Order Contract
//!
//! The builder consumes a depth-first, lexically-ordered walk in which a
//! directory is fully exhausted before its next sibling is visited. This is
//! what keeps the "current branch" pointer honest: a directory entry opens a
//! branch, and every following file attaches to it until the walk moves on.
//! `walkdir` with `sort_by_file_name` provides exactly this ordering.
//!
//! ## Content
//!
//! Node content is never stored in memory. [`Tree::content`] reads the
//! backing file on demand: the document itself for leaves, the directory's
//! `index.md` (or empty) for everything else. Large corpora therefore cost
//! memory proportional to the tree shape, not the document bytes.

use crate::naming;
use chrono::{DateTime, NaiveDate, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("walk docs directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("read metadata for {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        source: io::Error,
    },
    #[error("leaf filename must follow YYYY-MM-DD-name.md: {0:?}")]
    MalformedLeafName(PathBuf),
}

/// Display order for [`Tree::sort_by_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Index of a node within its [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One document or document-folder in the tree.
///
/// Fields are private; all access goes through [`Tree`] methods taking a
/// [`NodeId`], which is also where the memoized derived attributes live.
#[derive(Debug)]
struct Node {
    /// OS-native path relative to the docs root. Empty for the root node.
    source_path: PathBuf,
    /// Base filename (directory name for branches). `home` is synthesized
    /// for the root by [`Tree::name`], not stored here.
    file_name: String,
    is_root: bool,
    is_leaf: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Date parsed from the filename prefix; present exactly for leaves.
    leaf_date: Option<NaiveDate>,
    /// Filesystem modification time, the date fallback for childless
    /// directories.
    modified: SystemTime,
    // Write-once caches for derived attributes.
    path: OnceLock<String>,
    name: OnceLock<String>,
    title: OnceLock<String>,
    date: OnceLock<NaiveDate>,
}

/// Site-wide values threaded through path and author derivation.
///
/// These are explicit constructor inputs rather than process globals: the
/// memoized web paths bake the context path in, so it must be fixed before
/// the first traversal.
#[derive(Debug, Clone)]
pub struct SiteOptions {
    context_path: String,
    author: String,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            context_path: "/".to_string(),
            author: "Anonymous".to_string(),
        }
    }
}

impl SiteOptions {
    /// Set the URL prefix prepended to every generated link. Normalized to
    /// carry both a leading and a trailing slash.
    pub fn with_context_path(mut self, path: &str) -> Self {
        if !path.is_empty() {
            let mut p = String::new();
            if !path.starts_with('/') {
                p.push('/');
            }
            p.push_str(path);
            if !p.ends_with('/') {
                p.push('/');
            }
            self.context_path = p;
        }
        self
    }

    /// Set the author attributed to every document.
    pub fn with_author(mut self, author: &str) -> Self {
        if !author.is_empty() {
            self.author = author.to_string();
        }
        self
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

/// The document tree: an arena of nodes plus the site options and the docs
/// root needed for lazy content reads.
#[derive(Debug)]
pub struct Tree {
    docs_root: PathBuf,
    options: SiteOptions,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Build the tree from a single pre-order walk of `docs_root`.
    ///
    /// Entries named `index.md` are skipped — they are read later as the
    /// enclosing directory's body content. Hidden entries (dot-prefixed) are
    /// skipped along with their subtrees. Every remaining file must follow
    /// the `YYYY-MM-DD-name.md` convention; a violation aborts the build.
    pub fn build(docs_root: &Path, options: SiteOptions) -> Result<Tree, TreeError> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut current_branch: Option<NodeId> = None;

        let walk = WalkDir::new(docs_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
            });

        for entry in walk {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if file_name == "index.md" {
                continue;
            }

            let is_leaf = !entry.file_type().is_dir();
            let source_path = entry
                .path()
                .strip_prefix(docs_root)
                .unwrap_or(entry.path())
                .to_path_buf();

            let leaf_date = if is_leaf {
                match naming::parse_leaf_name(&file_name) {
                    Some(leaf) => Some(leaf.date),
                    None => {
                        return Err(TreeError::MalformedLeafName(entry.path().to_path_buf()));
                    }
                }
            } else {
                None
            };

            let modified = entry
                .metadata()
                .map_err(TreeError::Walk)?
                .modified()
                .map_err(|source| TreeError::Metadata {
                    path: entry.path().to_path_buf(),
                    source,
                })?;

            let id = NodeId(nodes.len());
            let is_root = entry.depth() == 0;
            let parent = if is_root {
                // The walk root becomes the tree root; no parent.
                None
            } else if entry.depth() == 1 {
                // Immediate child of the root: start a new top-level branch.
                current_branch = Some(id);
                Some(NodeId(0))
            } else if !is_leaf {
                // Deeper directory: open a branch under the current one.
                let parent = current_branch;
                current_branch = Some(id);
                parent
            } else {
                // File: attach to the current branch without re-pointing it.
                current_branch
            };

            nodes.push(Node {
                source_path,
                file_name,
                is_root,
                is_leaf: is_leaf && !is_root,
                parent,
                children: Vec::new(),
                leaf_date,
                modified,
                path: OnceLock::new(),
                name: OnceLock::new(),
                title: OnceLock::new(),
                date: OnceLock::new(),
            });

            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
        }

        Ok(Tree {
            docs_root: docs_root.to_path_buf(),
            options,
            nodes,
            root: NodeId(0),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// All node ids in walk order. Mostly useful for invariant checks.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_root
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_leaf
    }

    /// OS-native path relative to the docs root; empty for the root node.
    pub fn source_path(&self, id: NodeId) -> &Path {
        &self.nodes[id.0].source_path
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    /// The author attributed to every node. A single site-wide value since
    /// documents carry no front matter.
    pub fn author(&self) -> &str {
        self.options.author()
    }

    /// Web-facing path: forward-slash separated, trailing slash, prefixed
    /// with the context path. Leaves point at the directory their
    /// `index.html` lands in, so every URL is bookmarkable.
    pub fn path(&self, id: NodeId) -> &str {
        let node = &self.nodes[id.0];
        node.path.get_or_init(|| {
            if node.is_root {
                return self.options.context_path().to_string();
            }
            let web = if node.is_leaf {
                let parent = node.source_path.parent().unwrap_or(Path::new(""));
                let name = self.name(id);
                let dir = web_slashes(parent);
                if dir.is_empty() {
                    name.to_string()
                } else {
                    format!("{dir}/{name}")
                }
            } else {
                web_slashes(&node.source_path)
            };
            format!("{}{}/", self.options.context_path(), web)
        })
    }

    /// Normalized name: `home` for the root, the directory name for
    /// branches, the date-and-extension-stripped filename for leaves.
    pub fn name(&self, id: NodeId) -> &str {
        let node = &self.nodes[id.0];
        node.name.get_or_init(|| {
            if node.is_root {
                "home".to_string()
            } else if node.is_leaf {
                // Validated during build; the prefix is always well-formed.
                naming::normalize_leaf_name(&node.file_name).unwrap_or_default()
            } else {
                node.file_name.clone()
            }
        })
    }

    /// Human-readable title derived from the name.
    pub fn title(&self, id: NodeId) -> &str {
        let node = &self.nodes[id.0];
        node.title.get_or_init(|| naming::title(self.name(id)))
    }

    /// The node's date. Leaves use the filename prefix; directories use the
    /// oldest date among their descendants, falling back to the filesystem
    /// modification time when they have no children at all.
    pub fn date(&self, id: NodeId) -> NaiveDate {
        let node = &self.nodes[id.0];
        if let Some(d) = node.date.get() {
            return *d;
        }
        let d = if node.is_leaf {
            node.leaf_date
                .expect("leaf nodes record their filename date at build")
        } else if let Some(oldest) = self.oldest(&node.children) {
            self.date(oldest)
        } else {
            DateTime::<Utc>::from(node.modified).date_naive()
        };
        let _ = node.date.set(d);
        d
    }

    /// The oldest node among `ids` by [`Tree::date`], first wins on ties.
    ///
    /// Always an ascending-order query: date inference for directories does
    /// not depend on the display sort direction.
    pub fn oldest(&self, ids: &[NodeId]) -> Option<NodeId> {
        let mut best: Option<(NodeId, NaiveDate)> = None;
        for &id in ids {
            let d = self.date(id);
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((id, d)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// All children of the parent except the node itself.
    ///
    /// Panics when called on the root: a root has no parent and therefore no
    /// siblings, and reaching this from sibling navigation is a programming
    /// error rather than bad input.
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        let parent = self.parent(id).expect("root node cannot have siblings");
        self.children(parent)
            .iter()
            .copied()
            .filter(|&c| c != id)
            .collect()
    }

    pub fn has_siblings(&self, id: NodeId) -> bool {
        !self.is_root(id) && !self.siblings(id).is_empty()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// The next child in the parent's current order. Panics on the root.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id).expect("root node cannot have siblings");
        let children = self.children(parent);
        let pos = children.iter().position(|&c| c == id)?;
        children.get(pos + 1).copied()
    }

    /// The previous child in the parent's current order. Panics on the root.
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id).expect("root node cannot have siblings");
        let children = self.children(parent);
        let pos = children.iter().position(|&c| c == id)?;
        pos.checked_sub(1).and_then(|p| children.get(p)).copied()
    }

    /// Read the node's content from disk.
    ///
    /// Leaves read their own file; an unreadable leaf is an error the caller
    /// must treat as fatal. Directories read their `index.md`, and its
    /// absence is absorbed into an empty string.
    pub fn content(&self, id: NodeId) -> io::Result<String> {
        let node = &self.nodes[id.0];
        if node.is_leaf {
            return std::fs::read_to_string(self.docs_root.join(&node.source_path));
        }
        let index = self.docs_root.join(&node.source_path).join("index.md");
        match std::fs::read_to_string(index) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Stable, recursive sort of every node's children by date.
    ///
    /// Ties keep their filesystem walk order in both directions. Calling
    /// this twice with the same direction is a no-op; it is the one
    /// post-construction mutation of the tree.
    pub fn sort_by_date(&mut self, direction: SortDirection) {
        self.sort_children(self.root, direction);
    }

    fn sort_children(&mut self, id: NodeId, direction: SortDirection) {
        let mut kids = std::mem::take(&mut self.nodes[id.0].children);
        kids.sort_by(|&a, &b| {
            let (da, db) = (self.date(a), self.date(b));
            match direction {
                SortDirection::Ascending => da.cmp(&db),
                SortDirection::Descending => db.cmp(&da),
            }
        });
        self.nodes[id.0].children = kids;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.sort_children(child, direction);
        }
    }
}

/// Join path components with forward slashes regardless of the host
/// separator. Web paths must not leak OS conventions.
fn web_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
