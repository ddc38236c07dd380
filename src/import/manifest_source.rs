//! Loading the manifest from disk, fetching it first when missing.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::Manifest;
use crate::sparql::{QueryError, SparqlTransport};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to access manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch manifest from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: QueryError,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ImportError + '_ {
    move |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Fetch the manifest from `url` and write it to `path`.
///
/// The document must parse before anything is written.
pub async fn download_manifest(
    path: &Path,
    url: &str,
    transport: &dyn SparqlTransport,
) -> Result<Manifest, ImportError> {
    info!("Downloading manifest from {}", url);
    let body = transport
        .get_text(url)
        .await
        .map_err(|source| ImportError::Fetch {
            url: url.to_string(),
            source,
        })?;
    let manifest = Manifest::from_json(&body)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }
    tokio::fs::write(path, body).await.map_err(io_error(path))?;
    info!("Saved manifest with {} datasets to {}", manifest.len(), path.display());

    Ok(manifest)
}

/// Read the manifest at `path`, downloading it first if the file is absent.
pub async fn load_or_fetch_manifest(
    path: &Path,
    url: &str,
    transport: &dyn SparqlTransport,
) -> Result<Manifest, ImportError> {
    if !path.exists() {
        return download_manifest(path, url, transport).await;
    }
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(io_error(path))?;
    Ok(Manifest::from_json(&body)?)
}
