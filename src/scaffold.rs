//! Project scaffolding: `init` and `create`.
//!
//! `init` lays out a ready-to-build site in an empty directory, with the
//! default theme written out as plain files so it can be edited in place.
//! The theme sources are embedded in the binary at compile time; no
//! network or install step involved.
//!
//! `create` is the day-to-day helper: it turns a post title into a
//! correctly date-prefixed filename so nobody has to remember the
//! convention.

use chrono::Local;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Site title used when `init` is not given one.
pub const DEFAULT_TITLE: &str = "My Page";

const THEME_BASE: &str = include_str!("../static/theme/base.html");
const THEME_DIR: &str = include_str!("../static/theme/dir.html");
const THEME_FILE: &str = include_str!("../static/theme/file.html");
const THEME_STYLE: &str = include_str!("../static/theme/style.css");

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("target directory is not empty: {0:?}")]
    NotEmpty(PathBuf),
    #[error("document already exists: {0:?}")]
    PostExists(PathBuf),
    #[error("write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("serialize meta.yaml: {0}")]
    Meta(#[from] serde_yaml::Error),
}

#[derive(Serialize)]
struct SiteMeta {
    title: String,
    socials: Vec<String>,
}

/// Scaffold a new site in `target`, which must be empty or missing.
/// Returns the created files, relative to `target`, for listing.
pub fn init_project(target: &Path, title: &str) -> Result<Vec<PathBuf>, ScaffoldError> {
    if target.is_dir()
        && target
            .read_dir()
            .map_err(|source| ScaffoldError::Write {
                path: target.to_path_buf(),
                source,
            })?
            .next()
            .is_some()
    {
        return Err(ScaffoldError::NotEmpty(target.to_path_buf()));
    }

    let meta = serde_yaml::to_string(&SiteMeta {
        title: title.to_string(),
        socials: vec!["https://github.com/you".to_string()],
    })?;
    let today = Local::now().date_naive().format("%Y-%m-%d");
    let first_post = PathBuf::from(format!("docs/{today}-hello-world.md"));

    let files: Vec<(PathBuf, String)> = vec![
        (PathBuf::from("meta.yaml"), meta),
        (PathBuf::from(".gitignore"), "/dist/\n".to_string()),
        (
            PathBuf::from("docs/index.md"),
            format!("# {title}\n\nWelcome.\n"),
        ),
        (
            first_post,
            "# Hello World\n\nThis is your first document. Add more with `mdpress create`.\n"
                .to_string(),
        ),
        (
            PathBuf::from(".theme/templates/base.html"),
            THEME_BASE.to_string(),
        ),
        (
            PathBuf::from(".theme/templates/dir.html"),
            THEME_DIR.to_string(),
        ),
        (
            PathBuf::from(".theme/templates/file.html"),
            THEME_FILE.to_string(),
        ),
        (
            PathBuf::from(".theme/assets/style.css"),
            THEME_STYLE.to_string(),
        ),
    ];

    let mut created = Vec::with_capacity(files.len());
    for (rel, content) in files {
        let path = target.join(&rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ScaffoldError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, content).map_err(|source| ScaffoldError::Write {
            path: path.clone(),
            source,
        })?;
        created.push(rel);
    }
    Ok(created)
}

/// Create a new document in `docs` named `<today>-<slug>.md`, seeded with
/// a top-level heading. Refuses to overwrite an existing document.
pub fn create_post(docs: &Path, title: &str) -> Result<PathBuf, ScaffoldError> {
    let today = Local::now().date_naive().format("%Y-%m-%d");
    let path = docs.join(format!("{today}-{}.md", slug(title)));
    if path.exists() {
        return Err(ScaffoldError::PostExists(path));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ScaffoldError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&path, format!("# {title}\n")).map_err(|source| ScaffoldError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Filename-safe slug: lowercase alphanumerics joined by single dashes.
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
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
