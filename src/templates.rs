//! Theme template execution.
//!
//! Themes are plain directories: `templates/` holds minijinja templates
//! (entry points `dir.html` and `file.html`, usually extending a shared
//! `base.html`) and `assets/` holds static files copied into the site.
//! Nothing is compiled in; a theme is swappable at build time.
//!
//! ## Template surface
//!
//! Every render binds the current document as `node`, a live view over the
//! tree. Attributes (`node.title`, `node.children`, ...) navigate without
//! touching disk; only `node.content()` reads the backing file, which is
//! why it is a method — a broken read surfaces as a template error and
//! fails the build instead of silently rendering an empty page.
//!
//! Global functions:
//!
//! | call                 | result                                        |
//! |----------------------|-----------------------------------------------|
//! | `meta()`             | the `meta.yaml` mapping                       |
//! | `render(text)`       | markdown → HTML                               |
//! | `toc(text)`          | heading outline `<ul>`                        |
//! | `excerpt(text)`      | first paragraph as HTML                       |
//! | `link(href)`         | `<link>` tag resolved against `assets/`       |
//!
//! Escaping is explicit: the environment renders values verbatim, since
//! paths, rendered markdown, and `link()` tags are all markup meant to
//! land in the page as-is. Themes apply the `escape` filter where they
//! want it.

use crate::markdown;
use crate::tree::{NodeId, Tree};
use minijinja::value::{Enumerator, Object, Value};
use minijinja::{context, path_loader, AutoEscape, Environment, ErrorKind, State};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template: {0:#}")]
    Render(#[from] minijinja::Error),
}

/// Attribute names exposed on `node`, in documentation order. Also the
/// object's enumeration: without it every node would be an empty map,
/// and empty maps are falsy, so `{% if node.next_sibling %}` could never
/// take the branch.
const NODE_ATTRS: &[&str] = &[
    "path",
    "name",
    "title",
    "date",
    "author",
    "is_root",
    "is_leaf",
    "has_children",
    "has_siblings",
    "children",
    "siblings",
    "parent",
    "root",
    "first_child",
    "next_sibling",
    "previous_sibling",
];

/// A document node as seen from inside a template.
#[derive(Debug)]
struct NodeObject {
    tree: Arc<Tree>,
    id: NodeId,
}

impl NodeObject {
    fn wrap(tree: &Arc<Tree>, id: NodeId) -> Value {
        Value::from_object(NodeObject {
            tree: Arc::clone(tree),
            id,
        })
    }

    fn wrap_all(&self, ids: &[NodeId]) -> Value {
        Value::from(
            ids.iter()
                .map(|&id| Self::wrap(&self.tree, id))
                .collect::<Vec<_>>(),
        )
    }

    fn wrap_opt(&self, id: Option<NodeId>) -> Value {
        id.map_or(Value::UNDEFINED, |id| Self::wrap(&self.tree, id))
    }
}

impl Object for NodeObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let tree = &self.tree;
        let id = self.id;
        // Sibling lookups on the root answer "none" here; the tree-level
        // accessors treat that as a caller bug, but a theme iterating
        // siblings on every page is not a bug.
        let is_root = tree.is_root(id);
        Some(match key.as_str()? {
            "path" => Value::from(tree.path(id)),
            "name" => Value::from(tree.name(id)),
            "title" => Value::from(tree.title(id)),
            "date" => Value::from(tree.date(id).format("%Y-%m-%d").to_string()),
            "author" => Value::from(tree.author()),
            "is_root" => Value::from(is_root),
            "is_leaf" => Value::from(tree.is_leaf(id)),
            "has_children" => Value::from(tree.has_children(id)),
            "has_siblings" => Value::from(tree.has_siblings(id)),
            "children" => self.wrap_all(tree.children(id)),
            "siblings" => {
                if is_root {
                    self.wrap_all(&[])
                } else {
                    self.wrap_all(&tree.siblings(id))
                }
            }
            "parent" => self.wrap_opt(tree.parent(id)),
            "root" => Self::wrap(tree, tree.root()),
            "first_child" => self.wrap_opt(tree.first_child(id)),
            "next_sibling" => {
                self.wrap_opt((!is_root).then(|| tree.next_sibling(id)).flatten())
            }
            "previous_sibling" => {
                self.wrap_opt((!is_root).then(|| tree.previous_sibling(id)).flatten())
            }
            _ => return None,
        })
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(NODE_ATTRS)
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        _args: &[Value],
    ) -> Result<Value, minijinja::Error> {
        match method {
            "content" => {
                let text = self.tree.content(self.id).map_err(|e| {
                    minijinja::Error::new(
                        ErrorKind::InvalidOperation,
                        format!("read content of {}: {e}", self.tree.path(self.id)),
                    )
                })?;
                Ok(Value::from(text))
            }
            _ => Err(minijinja::Error::from(ErrorKind::UnknownMethod)),
        }
    }
}

/// The configured template environment for one build.
pub struct Templater {
    env: Environment<'static>,
}

impl Templater {
    /// Set up the environment: a filesystem loader over the theme's
    /// templates directory plus the global function surface.
    pub fn new(templates_dir: &Path, meta: &serde_yaml::Value, context_path: &str) -> Templater {
        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir));
        env.set_auto_escape_callback(|_| AutoEscape::None);

        let meta = Value::from_serialize(meta);
        env.add_function("meta", move || meta.clone());
        env.add_function("render", |text: String| {
            Value::from_safe_string(markdown::render(&text))
        });
        env.add_function("toc", |text: String| {
            Value::from_safe_string(markdown::toc(&text))
        });
        env.add_function("excerpt", |text: String| {
            Value::from_safe_string(markdown::excerpt(&text))
        });

        let context_path = context_path.to_string();
        env.add_function("link", move |href: String, rel: Option<String>| {
            let rel = rel.unwrap_or_else(|| "stylesheet".to_string());
            Value::from_safe_string(format!(
                "<link rel=\"{rel}\" href=\"{context_path}assets/{href}\">"
            ))
        });

        Templater { env }
    }

    /// Render one node: `file.html` for leaves, `dir.html` for everything
    /// else (the root included).
    pub fn render_node(&self, tree: &Arc<Tree>, id: NodeId) -> Result<String, TemplateError> {
        let name = if tree.is_leaf(id) { "file.html" } else { "dir.html" };
        let template = self.env.get_template(name)?;
        let html = template.render(context! { node => NodeObject::wrap(tree, id) })?;
        Ok(html)
    }
}
