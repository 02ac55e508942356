use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use core_smap::{JobOutcome, SitemapConfig, collection_prefix, live_job, setup_logging};
use data_model_smap::{SitemapJobPayload, SitemapTargets};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "core-smap")]
#[command(about = "The Core Solr Sitemap Toolkit", long_about = None)]
struct CoreCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one sitemap now, using SOLR_URL and RESOLVER_URL from the environment.
    Generate {
        /// Output name; the sitemap is written to <out-dir>/<sitemap>.txt
        #[arg(short, long)]
        sitemap: String,
        /// Presentation set label to select, or 'alldiscoverable'.
        #[arg(short, long)]
        filter: String,
        /// Overrides SITEMAP_PUBLIC_DIR.
        #[arg(short, long, value_parser = validate_output_dir)]
        out_dir: Option<PathBuf>,
    },

    /// Validate a sitemap targets file.
    ValidateTargets {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the collection prefix derived for a collection path.
    Prefix { collection_path: String },
}

fn validate_output_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && !path.is_dir() {
        return Err(format!("Output path is not a directory: {}", path.display()));
    }

    Ok(path)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CoreCli::parse();

    match cli.command {
        Commands::Generate {
            sitemap,
            filter,
            out_dir,
        } => generate(sitemap, filter, out_dir).await,

        Commands::ValidateTargets { file } => match SitemapTargets::load(&file) {
            Ok(targets) => {
                println!("Valid sitemap targets file: {file:?}");
                for (name, target) in targets.iter() {
                    println!(
                        "  {name}: filter '{}' url {}",
                        target.filter_for(name),
                        target.url.as_deref().unwrap_or("-")
                    );
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("Invalid sitemap targets file ({file:?}): {e}");
                ExitCode::FAILURE
            }
        },

        Commands::Prefix { collection_path } => {
            println!("{}", collection_prefix(&collection_path));
            ExitCode::SUCCESS
        }
    }
}

async fn generate(sitemap: String, filter: String, out_dir: Option<PathBuf>) -> ExitCode {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();
    setup_logging("core_smap=info");

    let mut config = match SitemapConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = out_dir {
        config.public_dir = dir;
    }

    let job = match live_job(&config) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Cannot set up index or resolver client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling sitemap generation");
                cancel.cancel();
            }
        }
    });

    let payload = SitemapJobPayload::new(sitemap, filter);
    match job.run(uuid::Uuid::new_v4(), &payload, &cancel).await {
        JobOutcome::Completed { path, url_count } => {
            println!("Wrote {url_count} URLs to {}", path.display());
            ExitCode::SUCCESS
        }
        JobOutcome::Skipped { reason } => {
            println!("Skipped: {reason}");
            ExitCode::SUCCESS
        }
        JobOutcome::Failed { error } => {
            eprintln!("Failed to generate sitemap in {}: {error}", config.public_dir.display());
            ExitCode::FAILURE
        }
    }
}
