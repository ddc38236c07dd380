//! CLI parser and dispatch to command-specific modules.

mod collect;
mod init;
mod manage;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::report::HistogramField;

#[derive(Parser)]
#[command(name = "lodcensus")]
#[command(about = "Census of the SPARQL endpoints listed in the LOD Cloud")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config file)
    #[arg(long, global = true, env = "LODCENSUS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Download the LOD Cloud manifest
    Download,

    /// Probe every endpoint listed in the manifest
    Generate {
        /// Skip the triple, class and property battery
        #[arg(long)]
        skip_base_queries: bool,
        /// Directory of .sparql files to run against every endpoint
        #[arg(short, long)]
        queries_dir: Option<PathBuf>,
    },

    /// Run custom queries against every stored OK endpoint
    GenerateCustom {
        /// Directory of .sparql files
        #[arg(short, long)]
        queries_dir: PathBuf,
        /// Re-run queries whose results are already stored
        #[arg(long)]
        overwrite: bool,
    },

    /// Probe a single endpoint and dump it without storing
    Get {
        /// SPARQL endpoint access URL
        #[arg(short = 'u', long)]
        access_url: String,
        #[arg(long)]
        skip_base_queries: bool,
        #[arg(short, long)]
        queries_dir: Option<PathBuf>,
        /// Dump name
        #[arg(short, long, default_value = "endpoint")]
        output: String,
    },

    /// Dump OK endpoints
    Dump {
        /// Include FAIL, UNKNOWN and DUPLICATE endpoints
        #[arg(short, long)]
        all: bool,
        #[arg(short, long, default_value = "collection")]
        output: String,
    },

    /// Most used properties across endpoints
    TopProperties {
        #[arg(short = 'd', long)]
        separate_domains: bool,
        #[arg(short, long, default_value = "top_properties")]
        output: String,
    },

    /// Most used classes across endpoints
    TopClasses {
        #[arg(short = 'd', long)]
        separate_domains: bool,
        #[arg(short, long, default_value = "top_classes")]
        output: String,
    },

    /// Metric fields of every OK endpoint, largest first
    GetTotals {
        #[arg(short = 'd', long)]
        separate_domains: bool,
        #[arg(short, long, default_value = "endpoint_totals")]
        output: String,
    },

    /// Status counts and metric summaries
    GetStats {
        #[arg(short = 'd', long)]
        separate_domains: bool,
        #[arg(short, long, default_value = "endpoint_statistics")]
        output: String,
    },

    /// Remove one custom query result from every endpoint
    DeleteQuery {
        #[arg(short, long)]
        query: String,
    },

    /// Remove the results of every query in a directory
    DeleteDirQueries {
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Delete one endpoint
    Delete {
        #[arg(short = 'u', long)]
        access_url: String,
    },

    /// Delete every stored endpoint
    Drop {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Store a placeholder so imports skip an endpoint
    Skip {
        #[arg(short = 'u', long)]
        access_url: String,
    },

    /// List skipped endpoints
    GetSkipped,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };
    let (settings, _config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Download => collect::cmd_download(&settings).await,
        Commands::Generate {
            skip_base_queries,
            queries_dir,
        } => collect::cmd_generate(&settings, !skip_base_queries, queries_dir.as_deref()).await,
        Commands::GenerateCustom {
            queries_dir,
            overwrite,
        } => collect::cmd_generate_custom(&settings, &queries_dir, overwrite).await,
        Commands::Get {
            access_url,
            skip_base_queries,
            queries_dir,
            output,
        } => {
            collect::cmd_get(
                &settings,
                &access_url,
                !skip_base_queries,
                queries_dir.as_deref(),
                &output,
            )
            .await
        }
        Commands::Dump { all, output } => report::cmd_dump(&settings, all, &output).await,
        Commands::TopProperties {
            separate_domains,
            output,
        } => {
            report::cmd_top_instances(
                &settings,
                HistogramField::UsedProperties,
                separate_domains,
                &output,
            )
            .await
        }
        Commands::TopClasses {
            separate_domains,
            output,
        } => {
            report::cmd_top_instances(
                &settings,
                HistogramField::UsedClasses,
                separate_domains,
                &output,
            )
            .await
        }
        Commands::GetTotals {
            separate_domains,
            output,
        } => report::cmd_totals(&settings, separate_domains, &output).await,
        Commands::GetStats {
            separate_domains,
            output,
        } => report::cmd_stats(&settings, separate_domains, &output).await,
        Commands::DeleteQuery { query } => manage::cmd_delete_query(&settings, &query).await,
        Commands::DeleteDirQueries { dir } => manage::cmd_delete_dir_queries(&settings, &dir).await,
        Commands::Delete { access_url } => manage::cmd_delete(&settings, &access_url).await,
        Commands::Drop { yes } => manage::cmd_drop(&settings, yes).await,
        Commands::Skip { access_url } => manage::cmd_skip(&settings, &access_url).await,
        Commands::GetSkipped => manage::cmd_get_skipped(&settings).await,
    }
}
