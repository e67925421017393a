mod config;
mod dashboard;
mod error;
mod gamelog;
mod nba;
mod storage;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use tabled::Table;

use crate::config::AppConfig;
use crate::dashboard::{server, Dashboard};
use crate::gamelog::{build_combined_table, write_csv, ExportRequest, StatsApi};
use crate::nba::endpoints::CommonAllPlayers;
use crate::nba::params::Season;
use crate::storage::{download_latest, upload_with_increment, S3Store};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct NBACli {
    /// JSON config file; built-in defaults apply when omitted
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    cmd: Commands
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch game logs, save the filtered CSV and upload it to the bucket
    Export {
        #[clap(long)]
        start_date: Option<NaiveDate>,

        #[clap(long)]
        end_date: Option<NaiveDate>,

        #[clap(short, long)]
        season: Option<String>,

        /// Stop after writing the local CSV
        #[clap(long)]
        no_upload: bool,
    },
    /// Download the latest CSV from the bucket and serve the dashboard
    View {
        /// Serve the local CSV as it is
        #[clap(long)]
        skip_download: bool,

        #[clap(short, long)]
        bind: Option<String>,

        /// Open the dashboard in a browser
        #[clap(long)]
        open: bool,
    },
    /// Find player ids by name
    Lookup {
        player_name: String,

        #[clap(short, long)]
        season: Option<String>,
    },
}

fn init_logging() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

async fn export(config: AppConfig, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>, season: Option<String>, no_upload: bool) -> Result<()> {
    let mut export = config.export;
    if let Some(season) = season {
        export.season = Season::S(season);
    }
    let range = export.date_range(start_date, end_date)?;
    info!("Exporting {} players, {} to {}, season {}", export.players.len(), range.start, range.end, export.season.as_str());

    let export_job = export.clone();
    let summary = tokio::task::spawn_blocking(move || -> Result<_> {
        let request = ExportRequest {
            players: &export_job.players,
            range,
            season: &export_job.season,
            season_type: export_job.season_type,
            delay: export_job.request_delay(),
        };
        let mut table = build_combined_table(&StatsApi, &request)?;
        write_csv(&mut table.frame, &export_job.local_csv)?;
        Ok(table.summary)
    })
    .await
    .context("export worker panicked")??;

    println!("{}", Table::new(summary).to_string());
    info!("Filtered game logs saved to {}", export.local_csv.display());

    if no_upload {
        return Ok(());
    }
    let store = S3Store::connect(&config.storage).await;
    let key = upload_with_increment(&store, &export.local_csv, &export.object_key()).await?;
    info!("Stored s3://{}/{}", store.bucket(), key);
    Ok(())
}

async fn view(config: AppConfig, skip_download: bool, bind: Option<String>, open: bool) -> Result<()> {
    let viewer = config.viewer;
    if skip_download {
        info!("Using local {}", viewer.local_csv.display());
    } else {
        let store = S3Store::connect(&config.storage).await;
        download_latest(&store, &viewer.prefix, &viewer.local_csv).await?;
    }

    let dashboard = Arc::new(Dashboard::from_csv(&viewer.local_csv)?);
    let listener = server::bind(&bind.unwrap_or(viewer.bind)).await?;
    if open {
        let url = format!("http://{}", listener.local_addr()?);
        if let Err(e) = webbrowser::open(&url) {
            warn!("could not open {}: {}", url, e);
        }
    }
    server::serve(dashboard, listener).await
}

async fn lookup(player_name: String, season: Option<String>) -> Result<()> {
    let season = season.map(Season::S).unwrap_or_default();
    let matches = tokio::task::spawn_blocking(move || CommonAllPlayers::new(season).search(&player_name))
        .await
        .context("lookup worker panicked")??;
    if matches.is_empty() {
        println!("No players found");
    } else {
        println!("{}", Table::new(matches).to_string());
    }
    Ok(())
}

async fn run(args: NBACli) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    match args.cmd {
        Commands::Export { start_date, end_date, season, no_upload } => {
            export(config, start_date, end_date, season, no_upload).await
        }
        Commands::View { skip_download, bind, open } => {
            view(config, skip_download, bind, open).await
        }
        Commands::Lookup { player_name, season } => {
            lookup(player_name, season).await
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = NBACli::parse();
    if let Err(err) = run(args).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
