//! JSON configuration shared by `export`, `view` and `lookup`.
//!
//! Every field has a default, so the binary runs without a config file.

use std::{fs, path::{Path, PathBuf}, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::gamelog::DateRange;
use crate::nba::params::{Season, SeasonType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Used together with `secret_key`; otherwise the AWS default chain applies.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// S3-compatible endpoint; switches to path-style addressing.
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub season: Season,
    pub season_type: SeasonType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub players: Vec<Subject>,
    pub local_csv: PathBuf,
    /// Defaults to the file name of `local_csv`.
    pub object_key: Option<String>,
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub prefix: String,
    pub local_csv: PathBuf,
    pub bind: String,
}

const DEFAULT_CSV: &str = "nba_filtered_game_logs.csv";

const DEFAULT_PLAYERS: [(&str, &str); 12] = [
    ("Stephen Curry", "201939"),
    ("Kevin Durant", "201142"),
    ("Shai Gilgeous-Alexander", "1628983"),
    ("LeBron James", "2544"),
    ("Nikola Jokić", "203999"),
    ("Anthony Edwards", "1630162"),
    ("Anthony Davis", "203076"),
    ("James Harden", "201935"),
    ("Jaren Jackson Jr.", "1628991"),
    ("Alperen Sengun", "1630578"),
    ("Jalen Williams", "1631113"),
    ("Victor Wembanyama", "1641705"),
];

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            bucket: "nbadiyproject".to_string(),
            region: "us-east-2".to_string(),
            access_key: None,
            secret_key: None,
            endpoint_url: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            season: Season::S("2024-25".to_string()),
            season_type: SeasonType::RegularSeason,
            start_date: NaiveDate::from_ymd_opt(2025, 2, 19).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap_or(NaiveDate::MIN),
            players: DEFAULT_PLAYERS
                .iter()
                .map(|(name, id)| Subject { name: name.to_string(), id: id.to_string() })
                .collect(),
            local_csv: PathBuf::from(DEFAULT_CSV),
            object_key: None,
            request_delay_ms: 1000,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            prefix: "nba_filtered_game_logs_".to_string(),
            local_csv: PathBuf::from(DEFAULT_CSV),
            bind: "127.0.0.1:8050".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: AppConfig = match path {
            Some(p) => {
                let data = fs::read_to_string(p)
                    .with_context(|| format!("failed to read config {}", p.display()))?;
                serde_json::from_str(&data)
                    .with_context(|| format!("invalid config {}", p.display()))?
            }
            None => AppConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            bail!("storage.bucket must not be empty");
        }
        Ok(())
    }
}

impl ExportConfig {
    pub fn object_key(&self) -> String {
        self.object_key.clone().unwrap_or_else(|| {
            self.local_csv
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_CSV.to_string())
        })
    }

    /// The configured dates with command-line overrides applied; only the final pair must be ordered.
    pub fn date_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DateRange> {
        DateRange::new(start.unwrap_or(self.start_date), end.unwrap_or(self.end_date))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
