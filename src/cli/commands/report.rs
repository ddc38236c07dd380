//! Dumps and reports over the stored endpoints.

use console::style;
use indexmap::IndexMap;

use crate::config::Settings;
use crate::dump::export_dump;
use crate::models::EndpointStatus;
use crate::report::{HistogramField, Reporter};
use crate::repository::{EndpointFilter, EndpointStore};

fn print_written(path: &std::path::Path) {
    println!(
        "{} Data dump written to {}",
        style("✓").green(),
        path.display()
    );
}

/// Dump OK endpoints, or every endpoint with `all`.
pub async fn cmd_dump(settings: &Settings, all: bool, output: &str) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    let filter = if all {
        EndpointFilter::all()
    } else {
        EndpointFilter::status(EndpointStatus::Ok)
    };
    let records = store.find(&filter).await?;
    println!("  Endpoints: {}", records.len());

    print_written(&export_dump(&settings.dumps_dir, output, &records)?);
    Ok(())
}

pub async fn cmd_top_instances(
    settings: &Settings,
    field: HistogramField,
    separate_domains: bool,
    output: &str,
) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    let reporter = Reporter::new(&store);

    let path = if separate_domains {
        let mut per_domain = IndexMap::new();
        for domain in reporter.domains().await? {
            let top = reporter.top_instances(field, Some(&domain)).await?;
            per_domain.insert(domain, top);
        }
        export_dump(&settings.dumps_dir, output, &per_domain)?
    } else {
        let top = reporter.top_instances(field, None).await?;
        export_dump(&settings.dumps_dir, output, &top)?
    };

    print_written(&path);
    Ok(())
}

pub async fn cmd_totals(
    settings: &Settings,
    separate_domains: bool,
    output: &str,
) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    let reporter = Reporter::new(&store);

    let path = if separate_domains {
        let mut per_domain = IndexMap::new();
        for domain in reporter.domains().await? {
            let totals = reporter.collection_totals(Some(&domain)).await?;
            per_domain.insert(domain, totals);
        }
        export_dump(&settings.dumps_dir, output, &per_domain)?
    } else {
        let totals = reporter.collection_totals(None).await?;
        export_dump(&settings.dumps_dir, output, &totals)?
    };

    print_written(&path);
    Ok(())
}

pub async fn cmd_stats(
    settings: &Settings,
    separate_domains: bool,
    output: &str,
) -> anyhow::Result<()> {
    let store = settings.open_store().await?;
    let reporter = Reporter::new(&store);

    let overall = reporter.statistics(None).await?;
    println!("  Endpoints: {}", overall.endpoints);
    for (status, count) in &overall.status_counts {
        println!("    {:<10} {}", status, count);
    }
    println!(
        "  Triples:   {} trustworthy, {} total",
        overall.triples.can_get, overall.triples.sum
    );

    let path = if separate_domains {
        let mut per_domain = IndexMap::new();
        for domain in reporter.domains().await? {
            let stats = reporter.statistics(Some(&domain)).await?;
            per_domain.insert(domain, stats);
        }
        export_dump(&settings.dumps_dir, output, &per_domain)?
    } else {
        export_dump(&settings.dumps_dir, output, &overall)?
    };

    print_written(&path);
    Ok(())
}
