//! In-memory view over the downloaded CSV: one player, two stats, split by win/loss.

pub mod render;
pub mod server;

use std::{collections::HashSet, fs, path::Path};

use anyhow::Context;
use log::info;
use polars::prelude::*;

use crate::gamelog::PLAYER;
use crate::nba::endpoints::string_column;

pub const STAT_OPTIONS: [&str; 8] = ["PTS", "REB", "AST", "TOV", "FGA", "FTA", "FGM", "FTM"];
pub const OUTCOME: &str = "WL";
pub const DEFAULT_X: &str = "PTS";
pub const DEFAULT_Y: &str = "REB";

#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error("unknown stat `{0}`")]
    UnknownStat(String),

    #[error("dataset error: {0}")]
    Data(#[from] PolarsError),
}

/// What the three dropdowns currently say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub player: Option<String>,
    pub x: String,
    pub y: String,
}

/// Points for one `WL` value.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSeries {
    pub outcome: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<OutcomeSeries>,
}

pub struct Dashboard {
    frame: DataFrame,
    players: Vec<String>,
}

impl Dashboard {
    /// Loads the CSV once. An empty file gives a dashboard with no players.
    pub fn from_csv(path: &Path) -> anyhow::Result<Self> {
        let size = fs::metadata(path)
            .with_context(|| format!("missing dataset {}", path.display()))?
            .len();
        let frame = if size == 0 {
            DataFrame::default()
        } else {
            CsvReader::from_path(path)?
                .has_header(true)
                .finish()
                .with_context(|| format!("failed to parse {}", path.display()))?
        };
        let dashboard = Dashboard::new(frame)?;
        info!("Loaded {} rows for {} players", dashboard.frame.height(), dashboard.players.len());
        Ok(dashboard)
    }

    pub fn new(frame: DataFrame) -> Result<Self, DashboardError> {
        let players = if frame.get_column_names().contains(&PLAYER) {
            let mut seen = HashSet::new();
            string_column(&frame, PLAYER)?
                .into_iter()
                .flatten()
                .filter(|p| seen.insert(p.clone()))
                .collect()
        } else {
            Vec::new()
        };
        Ok(Dashboard { frame, players })
    }

    /// Distinct players in first-seen order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// The initial selection: first player, points against rebounds.
    pub fn default_selection(&self) -> Selection {
        Selection {
            player: self.players.first().cloned(),
            x: DEFAULT_X.to_string(),
            y: DEFAULT_Y.to_string(),
        }
    }

    /// Recomputes the plot from scratch. `None` means there is nothing to plot.
    pub fn scatter(&self, selection: &Selection) -> Result<Option<Scatter>, DashboardError> {
        for stat in [&selection.x, &selection.y] {
            if !STAT_OPTIONS.contains(&stat.as_str()) {
                return Err(DashboardError::UnknownStat(stat.clone()));
            }
        }
        let player = match &selection.player {
            Some(p) if self.players.contains(p) => p,
            _ => return Ok(None),
        };

        let names = string_column(&self.frame, PLAYER)?;
        let mask = names.iter().map(|n| n.as_deref() == Some(player.as_str())).collect::<Vec<bool>>();
        let rows = self.frame.filter(&BooleanChunked::from_slice("player", &mask))?;

        let xs = rows.column(&selection.x)?.cast(&DataType::Float64)?;
        let ys = rows.column(&selection.y)?.cast(&DataType::Float64)?;
        let outcomes = if rows.get_column_names().contains(&OUTCOME) {
            string_column(&rows, OUTCOME)?
        } else {
            vec![None; rows.height()]
        };

        let mut series: Vec<OutcomeSeries> = Vec::new();
        for ((x, y), outcome) in xs.f64()?.into_iter().zip(ys.f64()?.into_iter()).zip(outcomes) {
            let (x, y) = match (x, y) {
                (Some(x), Some(y)) => (x, y),
                _ => continue,
            };
            let outcome = outcome.unwrap_or_else(|| "?".to_string());
            match series.iter_mut().find(|s| s.outcome == outcome) {
                Some(s) => s.points.push((x, y)),
                None => series.push(OutcomeSeries { outcome, points: vec![(x, y)] }),
            }
        }

        Ok(Some(Scatter {
            title: format!("{}: {} vs {}", player, selection.x, selection.y),
            x_label: selection.x.clone(),
            y_label: selection.y.clone(),
            series,
        }))
    }
}
