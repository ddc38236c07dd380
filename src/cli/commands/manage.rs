//! Store maintenance: deleting results and endpoints, skip placeholders.

use std::path::Path;

use console::style;

use crate::cli::helpers::{confirm, parse_access_url};
use crate::config::Settings;
use crate::models::{EndpointRecord, EndpointStatus};
use crate::probe::custom_query_names;
use crate::repository::{EndpointFilter, EndpointStore};

/// Remove one custom query result from every endpoint.
pub async fn cmd_delete_query(settings: &Settings, query: &str) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    let changed = store.delete_fields(&[query.to_string()]).await?;
    println!(
        "{} Removed '{}' from {} endpoints",
        style("✓").green(),
        query,
        changed
    );
    Ok(())
}

/// Remove the results of every query file in `dir`.
pub async fn cmd_delete_dir_queries(settings: &Settings, dir: &Path) -> anyhow::Result<()> {
    let names = custom_query_names(dir)?;
    let store = settings.open_store().await?;
    let changed = store.delete_fields(&names).await?;
    println!(
        "{} Removed {} query results from {} endpoints",
        style("✓").green(),
        names.len(),
        changed
    );
    Ok(())
}

pub async fn cmd_delete(settings: &Settings, access_url: &str) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    if store.delete(access_url).await? {
        println!("{} Deleted {}", style("✓").green(), access_url);
    } else {
        println!("{} No endpoint stored for {}", style("!").yellow(), access_url);
    }
    Ok(())
}

/// Delete every stored endpoint after confirmation.
pub async fn cmd_drop(settings: &Settings, yes: bool) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    let count = store.count(&EndpointFilter::all()).await?;
    if count == 0 {
        println!("{} The collection is already empty", style("!").yellow());
        return Ok(());
    }

    if !yes {
        println!(
            "{} This will delete all {} stored endpoints.",
            style("!").yellow(),
            count
        );
        if !confirm("Proceed?")? {
            println!("{} Cancelled", style("!").yellow());
            return Ok(());
        }
    }

    let dropped = store.drop_collection().await?;
    println!("{} Dropped {} endpoints", style("✓").green(), dropped);
    Ok(())
}

/// Insert an UNKNOWN placeholder so imports leave the endpoint alone.
pub async fn cmd_skip(settings: &Settings, access_url: &str) -> anyhow::Result<()> {
    let access_url = parse_access_url(access_url)?;
    let store = settings.open_store().await?;

    if let Some(existing) = store.get(&access_url).await? {
        println!(
            "{} {} is already stored with status {}",
            style("!").yellow(),
            access_url,
            existing.status
        );
        return Ok(());
    }

    store.upsert(&EndpointRecord::placeholder(&access_url)).await?;
    println!(
        "{} {} will be skipped on further imports",
        style("✓").green(),
        access_url
    );
    Ok(())
}

pub async fn cmd_get_skipped(settings: &Settings) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    let skipped = store
        .find(&EndpointFilter::status(EndpointStatus::Unknown))
        .await?;

    if skipped.is_empty() {
        println!("There are no skipped endpoints");
    }
    for record in skipped {
        println!("{}", record.access_url);
    }
    Ok(())
}
