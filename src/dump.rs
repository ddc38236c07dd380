//! JSON dumps of reports and endpoint records.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

/// Write `value` as pretty JSON to `<dir>/<name>.json`, creating `dir`.
///
/// Returns the path written.
pub fn export_dump<T: Serialize + ?Sized>(
    dir: &Path,
    name: &str,
    value: &T,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", name.trim_end_matches(".json")));
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json)?;
    info!("Wrote dump {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointRecord, EndpointStatus};
    use tempfile::tempdir;

    #[test]
    fn test_dump_creates_directory_and_file() {
        let dir = tempdir().unwrap();
        let dumps = dir.path().join("dumps");
        let mut record = EndpointRecord::new("http://a/sparql");
        record.status = EndpointStatus::Fail;

        let path = export_dump(&dumps, "endpoints", &vec![record]).unwrap();
        assert_eq!(path, dumps.join("endpoints.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["access_url"], "http://a/sparql");
        assert_eq!(written[0]["status"], "FAIL");
    }

    #[test]
    fn test_name_with_extension_not_doubled() {
        let dir = tempdir().unwrap();
        let path = export_dump(dir.path(), "stats.json", &serde_json::json!({"n": 1})).unwrap();
        assert_eq!(path.file_name().unwrap(), "stats.json");
    }
}
