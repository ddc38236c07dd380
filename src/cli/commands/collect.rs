//! Commands that talk to remote endpoints: manifest download, imports and
//! single-endpoint probes.

use std::path::Path;

use console::style;

use crate::cli::helpers::{check_queries_dir, parse_access_url, print_import_stats};
use crate::config::Settings;
use crate::dump::export_dump;
use crate::import::{download_manifest, load_or_fetch_manifest, ManifestImporter};
use crate::probe::{EndpointProber, ProbeOptions};

/// Fetch the LOD Cloud manifest to the manifest file.
pub async fn cmd_download(settings: &Settings) -> anyhow::Result<()> {
    let client = settings.create_http_client()?;
    println!(
        "{} Downloading manifest from {}",
        style("→").cyan(),
        settings.manifest_url
    );
    let manifest = download_manifest(&settings.manifest_file, &settings.manifest_url, &client).await?;
    println!(
        "{} Saved {} datasets to {}",
        style("✓").green(),
        manifest.len(),
        settings.manifest_file.display()
    );
    Ok(())
}

/// Probe every endpoint of the manifest and store the results.
pub async fn cmd_generate(
    settings: &Settings,
    include_base_queries: bool,
    queries_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let custom_queries_dir = check_queries_dir(queries_dir)?;
    if !include_base_queries && custom_queries_dir.is_none() {
        println!(
            "{} Nothing to run: base queries skipped and no queries directory given",
            style("!").yellow()
        );
        return Ok(());
    }

    let client = settings.create_http_client()?;
    let store = settings.open_store().await?;
    let manifest =
        load_or_fetch_manifest(&settings.manifest_file, &settings.manifest_url, &client).await?;
    println!(
        "{} Processing {} datasets",
        style("→").cyan(),
        manifest.len()
    );

    let options = ProbeOptions {
        include_base_queries,
        custom_queries_dir,
        only_new_custom_queries: true,
    };
    let stats = ManifestImporter::new(&client, &store)
        .import_from(&manifest, &options)
        .await;

    println!("{} LOD Cloud processing finished", style("✓").green());
    print_import_stats(&stats);
    Ok(())
}

/// Run custom queries against every stored OK endpoint.
pub async fn cmd_generate_custom(
    settings: &Settings,
    queries_dir: &Path,
    overwrite: bool,
) -> anyhow::Result<()> {
    let custom_queries_dir = check_queries_dir(Some(queries_dir))?;

    let client = settings.create_http_client()?;
    let store = settings.open_store().await?;
    let options = ProbeOptions {
        include_base_queries: false,
        custom_queries_dir,
        only_new_custom_queries: !overwrite,
    };
    let stats = ManifestImporter::new(&client, &store)
        .refresh_custom_queries(&options)
        .await?;

    println!(
        "{} Updated {} of {} OK endpoints",
        style("✓").green(),
        stats.ok,
        stats.endpoints_seen
    );
    if stats.skipped > 0 {
        println!(
            "  {} {} unreachable endpoints kept as stored",
            style("!").yellow(),
            stats.skipped
        );
    }
    if stats.errors > 0 {
        println!("  {} Store errors: {}", style("!").yellow(), stats.errors);
    }
    Ok(())
}

/// Probe one endpoint and dump the result without storing it.
pub async fn cmd_get(
    settings: &Settings,
    access_url: &str,
    include_base_queries: bool,
    queries_dir: Option<&Path>,
    output: &str,
) -> anyhow::Result<()> {
    let access_url = parse_access_url(access_url)?;
    let custom_queries_dir = check_queries_dir(queries_dir)?;

    let client = settings.create_http_client()?;
    let options = ProbeOptions {
        include_base_queries,
        custom_queries_dir,
        only_new_custom_queries: false,
    };
    println!("{} Probing {}", style("→").cyan(), access_url);
    let record = EndpointProber::new(&client)
        .probe(&access_url, &options)
        .await;

    match &record.error_message {
        Some(error) if !record.is_ok() => {
            println!("{} Endpoint unreachable: {}", style("✗").red(), error)
        }
        _ => println!("{} Endpoint status {}", style("✓").green(), record.status),
    }

    let path = export_dump(&settings.dumps_dir, output, &record)?;
    println!("  Written to {}", path.display());
    Ok(())
}
