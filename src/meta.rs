//! Site metadata from `meta.yaml`.
//!
//! The file is free-form: whatever mapping the author writes is exposed
//! verbatim to templates through the `meta()` function. A missing file is
//! normal (a site needs no metadata to build) and yields an empty mapping,
//! so themes can always write `meta().title` style lookups and get
//! undefined rather than an error.

use serde_yaml::{Mapping, Value};
use std::io;
use std::path::Path;
use thiserror::Error;

/// Filename looked up at the source root.
pub const META_FILE: &str = "meta.yaml";

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("read meta.yaml: {0}")]
    Io(#[from] io::Error),
    #[error("parse meta.yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load `meta.yaml` from the source root.
///
/// Absent file and empty file both normalize to an empty mapping; an
/// unreadable or malformed file is an error.
pub fn load(source_root: &Path) -> Result<Value, MetaError> {
    let path = source_root.join(META_FILE);
    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Value::Mapping(Mapping::new()));
        }
        Err(e) => return Err(e.into()),
    };
    let value: Value = serde_yaml::from_str(&text)?;
    // An empty or comment-only file parses as null; hand templates a
    // mapping anyway.
    Ok(match value {
        Value::Null => Value::Mapping(Mapping::new()),
        other => other,
    })
}
