//! Shared helper functions for CLI commands.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use console::style;

use crate::import::ImportStats;
use crate::probe::custom_query_names;

/// Ask a yes/no question on stdin; anything but `y` is a no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Reject a queries directory that is missing or holds no query files,
/// before any endpoint is touched.
pub fn check_queries_dir(dir: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    match dir {
        Some(dir) => {
            let names = custom_query_names(dir)?;
            println!(
                "{} {} custom queries in {}",
                style("→").cyan(),
                names.len(),
                dir.display()
            );
            Ok(Some(dir.to_path_buf()))
        }
        None => Ok(None),
    }
}

/// Endpoint URLs must be absolute http(s) URLs.
pub fn parse_access_url(raw: &str) -> anyhow::Result<String> {
    let url = url::Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("Invalid access URL '{}': {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Access URL must use http or https: {}", raw);
    }
    // Stored keys are the URL as given, not the normalized form
    Ok(raw.trim().to_string())
}

pub fn print_import_stats(stats: &ImportStats) {
    println!("  Datasets:        {}", stats.datasets);
    println!("  Endpoints seen:  {}", stats.endpoints_seen);
    println!("  {} OK:           {}", style("✓").green(), stats.ok);
    println!("  {} Failed:       {}", style("✗").red(), stats.failed);
    println!("  {} Duplicates:   {}", style("=").yellow(), stats.duplicates);
    println!("  Merged:          {}", stats.merged);
    println!("  Skipped:         {}", stats.skipped);
    if stats.errors > 0 {
        println!("  {} Store errors: {}", style("!").yellow(), stats.errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_access_url() {
        assert_eq!(
            parse_access_url(" http://dbpedia.org/sparql ").unwrap(),
            "http://dbpedia.org/sparql"
        );
        assert!(parse_access_url("ftp://x/sparql").is_err());
        assert!(parse_access_url("not a url").is_err());
    }

    #[test]
    fn test_queries_dir_checked_up_front() {
        let dir = tempdir().unwrap();
        assert!(check_queries_dir(None).unwrap().is_none());
        assert!(check_queries_dir(Some(dir.path())).is_err());
        assert!(check_queries_dir(Some(&dir.path().join("missing"))).is_err());

        std::fs::write(dir.path().join("count.sparql"), "SELECT * WHERE {}").unwrap();
        assert_eq!(
            check_queries_dir(Some(dir.path())).unwrap(),
            Some(dir.path().to_path_buf())
        );
    }
}
