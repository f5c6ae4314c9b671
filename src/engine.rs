//! Build orchestration.
//!
//! The [`Engine`] owns the resolved directory layout for one site and runs
//! the full pipeline:
//!
//! ```text
//! <source>/
//! ├── docs/          # documents (walked into the tree)
//! ├── meta.yaml      # optional site metadata
//! ├── assets/        # optional extra assets
//! ├── .theme/        # default theme location
//! │   ├── templates/
//! │   └── assets/
//! └── dist/          # default output (reset every run)
//! ```
//!
//! `run()` is a from-scratch build: dist is deleted and recreated, so
//! renamed or removed documents never leave stale pages behind.

use crate::highlight;
use crate::meta::{self, MetaError};
use crate::minify;
use crate::render::{self, RenderError, RenderedPage};
use crate::templates::Templater;
use crate::tree::{SiteOptions, SortDirection, Tree, TreeError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Meta(#[from] MetaError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("walk assets: {0}")]
    AssetWalk(walkdir::Error),
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

fn io_err(context: &'static str, path: &Path) -> impl FnOnce(io::Error) -> EngineError {
    let path = path.to_path_buf();
    move |source| EngineError::Io {
        context,
        path,
        source,
    }
}

/// Unresolved build settings, straight from the CLI.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub source: PathBuf,
    pub dist: Option<PathBuf>,
    pub theme: Option<PathBuf>,
    pub author: Option<String>,
    pub context_path: Option<String>,
    pub style: Option<String>,
}

/// A configured build pipeline over one source directory.
#[derive(Debug)]
pub struct Engine {
    source: PathBuf,
    docs: PathBuf,
    dist: PathBuf,
    theme: PathBuf,
    style: String,
    options: SiteOptions,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Engine {
        let source = config.source;
        let docs = source.join("docs");
        let dist = config.dist.unwrap_or_else(|| source.join("dist"));
        let theme = config.theme.unwrap_or_else(|| source.join(".theme"));
        let style = config
            .style
            .unwrap_or_else(|| highlight::DEFAULT_STYLE.to_string());

        let mut options = SiteOptions::default();
        if let Some(author) = &config.author {
            options = options.with_author(author);
        }
        if let Some(context_path) = &config.context_path {
            options = options.with_context_path(context_path);
        }

        Engine {
            source,
            docs,
            dist,
            theme,
            style,
            options,
        }
    }

    pub fn dist(&self) -> &Path {
        &self.dist
    }

    /// Paths the serve loop should watch for changes. Only existing ones;
    /// watchers error on paths that are not there.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        [
            self.docs.clone(),
            self.theme.clone(),
            self.source.join(meta::META_FILE),
            self.source.join("assets"),
        ]
        .into_iter()
        .filter(|p| p.exists())
        .collect()
    }

    /// Run the full build, returning the pages written.
    pub fn run(&self) -> Result<Vec<RenderedPage>, EngineError> {
        self.reset_dist()?;

        let meta = meta::load(&self.source)?;
        let templater = Templater::new(
            &self.theme.join("templates"),
            &meta,
            self.options.context_path(),
        );

        let mut tree = Tree::build(&self.docs, self.options.clone())?;
        tree.sort_by_date(SortDirection::Descending);
        let tree = Arc::new(tree);

        let pages = render::render_site(&tree, &templater, &self.dist)?;

        let assets = self.dist.join("assets");
        self.copy_assets(&self.theme.join("assets"), &assets)?;
        self.copy_assets(&self.source.join("assets"), &assets)?;
        self.write_highlight_css(&assets)?;

        Ok(pages)
    }

    fn reset_dist(&self) -> Result<(), EngineError> {
        match std::fs::remove_dir_all(&self.dist) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err("reset dist", &self.dist)(e)),
        }
        std::fs::create_dir_all(&self.dist).map_err(io_err("create dist", &self.dist))
    }

    /// Recursively copy an asset directory, minifying css and js on the
    /// way. A missing source directory is skipped, themes and sites
    /// without extra assets are fine.
    fn copy_assets(&self, from: &Path, to: &Path) -> Result<(), EngineError> {
        if !from.is_dir() {
            return Ok(());
        }
        for entry in WalkDir::new(from).sort_by_file_name() {
            let entry = entry.map_err(EngineError::AssetWalk)?;
            let rel = entry
                .path()
                .strip_prefix(from)
                .unwrap_or(entry.path());
            let dest = to.join(rel);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest).map_err(io_err("create asset dir", &dest))?;
                continue;
            }
            match minify::content_type_for(entry.path()) {
                Some(content_type) => {
                    let text = std::fs::read_to_string(entry.path())
                        .map_err(io_err("read asset", entry.path()))?;
                    std::fs::write(&dest, minify::minify(content_type, &text))
                        .map_err(io_err("write asset", &dest))?;
                }
                None => {
                    std::fs::copy(entry.path(), &dest)
                        .map(|_| ())
                        .map_err(io_err("copy asset", &dest))?;
                }
            }
        }
        Ok(())
    }

    fn write_highlight_css(&self, assets: &Path) -> Result<(), EngineError> {
        std::fs::create_dir_all(assets).map_err(io_err("create asset dir", assets))?;
        let css = minify::minify("text/css", &highlight::stylesheet(&self.style));
        let path = assets.join("highlight.css");
        std::fs::write(&path, css).map_err(io_err("write highlight css", &path))
    }
}
