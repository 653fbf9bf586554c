use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use epg_sift::xmltv::{build_epg, write_outputs};
use epg_sift::{AllowList, Config};

#[derive(Parser, Debug)]
#[command(name = "epg-sift", about = "Fetch, filter, and merge XMLTV EPG feeds")]
struct Args {
    /// Path to the TOML config file (missing file uses built-in defaults)
    #[arg(long, value_name = "FILE", default_value = "epg-sift.toml")]
    config: PathBuf,

    /// Allow-list file, one channel identifier per line (overrides config)
    #[arg(long, value_name = "FILE")]
    allowlist: Option<PathBuf>,

    /// Directory to write the merged guide into (overrides config)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip writing the gzip-compressed copy of the output
    #[arg(long)]
    no_gzip: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(allowlist) = args.allowlist {
        config.allowlist = Some(allowlist);
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if args.no_gzip {
        config.save_gzip = false;
    }

    // A missing allow-list is a configuration error, fatal before any
    // network activity. Every later failure is per-feed and non-fatal.
    let allowlist_path = config.allowlist_path();
    let allow = AllowList::load(&allowlist_path).with_context(|| {
        format!(
            "Failed to read allow-list '{}'",
            allowlist_path.display()
        )
    })?;

    let client = reqwest::Client::new();
    let (guide, stats) = build_epg(
        &client,
        &config.urls,
        &allow,
        config.timeout(),
        config.max_feed_size(),
    )
    .await;

    let xml_path = config.xml_output_path();
    write_outputs(&guide, &xml_path, config.save_gzip)
        .with_context(|| format!("Failed to write EPG to {}", xml_path.display()))?;

    tracing::info!(
        feeds_merged = stats.feeds_merged,
        feeds_skipped = stats.feeds_skipped,
        channels = stats.channels,
        programmes = stats.programmes,
        "Merge complete"
    );
    println!("New EPG saved to {}", xml_path.display());
    if config.save_gzip {
        println!(
            "New EPG saved to {}",
            epg_sift::xmltv::gz_path_for(&xml_path).display()
        );
    }

    Ok(())
}
