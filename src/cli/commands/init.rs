//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::repository::{EndpointFilter, EndpointStore};

/// Create the data directories and the database schema.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let existed = settings.database_exists();
    let store = settings.open_store().await?;

    if existed {
        let count = store.count(&EndpointFilter::all()).await?;
        println!(
            "{} Database already initialized ({} endpoints)",
            style("!").yellow(),
            count
        );
    }

    println!(
        "{} Initialized lodcensus in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!("  Database: {}", settings.database_path().display());
    println!("  Dumps:    {}", settings.dumps_dir.display());

    Ok(())
}
