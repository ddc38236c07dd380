//! User-supplied queries loaded from a directory of `.sparql` files.

use std::path::{Path, PathBuf};

use thiserror::Error;

const QUERY_EXTENSION: &str = "sparql";

#[derive(Debug, Error)]
pub enum CustomQueryError {
    #[error("Queries directory does not exist: {0}")]
    Missing(PathBuf),

    #[error("Queries directory holds no .sparql files: {0}")]
    Empty(PathBuf),

    #[error("Failed to read queries: {0}")]
    Io(#[from] std::io::Error),
}

/// A query file: its stem names the stored result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomQuery {
    pub name: String,
    pub body: String,
}

fn query_paths(dir: &Path) -> Result<Vec<PathBuf>, CustomQueryError> {
    if !dir.is_dir() {
        return Err(CustomQueryError::Missing(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(QUERY_EXTENSION) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(CustomQueryError::Empty(dir.to_path_buf()));
    }
    paths.sort();
    Ok(paths)
}

fn stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Load every `.sparql` file in `dir`, sorted by file name.
pub fn load_custom_queries(dir: &Path) -> Result<Vec<CustomQuery>, CustomQueryError> {
    let mut queries = Vec::new();
    for path in query_paths(dir)? {
        let Some(name) = stem(&path) else {
            continue;
        };
        let body = std::fs::read_to_string(&path)?;
        queries.push(CustomQuery { name, body });
    }
    Ok(queries)
}

/// Names of the queries in `dir` without reading their bodies.
pub fn custom_query_names(dir: &Path) -> Result<Vec<String>, CustomQueryError> {
    Ok(query_paths(dir)?.iter().filter_map(|p| stem(p)).collect())
}
