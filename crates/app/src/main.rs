//! Kerbside CLI

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kerbside::catalog::Segment;
use kerbside_app::config::AppConfig;
use kerbside_app::context::AppContext;
use kerbside_app::router::Resolution;

#[derive(Debug, Parser)]
#[command(name = "kerbside", about = "Kerbside storefront engine", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch all remote data and print a catalog summary.
    Sync,
    /// Resolve a client-side path and print the page it activates.
    Resolve {
        /// Path to resolve, e.g. /services/tyre-replacement
        path: String,
    },
}

#[tokio::main]
async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.config.log_level);

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive.to_string()));

    _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Sync => sync(&cli.config).await,
        Commands::Resolve { path } => resolve(&cli.config, &path).await,
    }
}

async fn sync(config: &AppConfig) -> Result<(), String> {
    let mut app = boot(config).await?;
    app.load_reviews().await;

    for segment in Segment::ALL {
        println!(
            "{:>20}: {} services",
            segment.label(),
            app.store.segment_services(segment).len()
        );
    }
    println!("{:>20}: {} entries", "Reviews", app.store.reviews().len());

    if let Some(profile) = app.store.user_details() {
        println!("restored session for {}", profile.mobile);
    }

    Ok(())
}

async fn resolve(config: &AppConfig, path: &str) -> Result<(), String> {
    let mut app = boot(config).await?;

    match app.router.navigate(&mut app.store, path) {
        Resolution::Show(page) => println!("{path} -> {page:?}"),
        Resolution::RequiresAuth => println!("{path} -> requires authentication"),
    }

    Ok(())
}

async fn boot(config: &AppConfig) -> Result<AppContext, String> {
    AppContext::init(config)
        .await
        .map_err(|error| format!("failed to load app data, please refresh: {error}"))
}
