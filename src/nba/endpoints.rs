use crate::nba::params::*;
use polars::prelude::*;
use serde_json::Value;
use std::{collections::HashMap, time::{Duration, Instant}};
use anyhow::{anyhow, Context, Result};
use log::debug;
use tabled::Tabled;

const NBA_BASE_URL: &str = "https://stats.nba.com/stats";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct PlayerGameLog {
    pub player_id: PlayerID,
    pub season: Season,
    pub season_type: SeasonType,
    pub league_id: LeagueID,
}

pub struct CommonAllPlayers {
    pub league_id: LeagueID,
    pub season: Season,
    pub current_only: IsOnlyCurrentSeason,
}

/// One row of a `lookup` result.
#[derive(Tabled, Debug, Clone, PartialEq)]
pub struct PlayerMatch {
    pub id: String,
    pub name: String,
    pub team: String,
    pub years: String,
}

impl LoadDataframes for PlayerGameLog {
}

impl LoadDataframes for CommonAllPlayers {
}

pub trait NBAEndpoint {
    fn endpoint_url(&self) -> String;

    fn send_request(&self) -> Result<Value> {
        fetch_nba_json(&self.endpoint_url())
    }
}

pub trait LoadDataframes: NBAEndpoint {
    fn load_dataframes(&self) -> Result<HashMap<String, DataFrame>> {
        let endpoint_json = self.send_request()?;
        let load_start = Instant::now();
        let frames = result_sets_to_frames(&endpoint_json)?;
        debug!("dataframe loading took {:?}", load_start.elapsed());
        Ok(frames)
    }
}

impl NBAEndpoint for PlayerGameLog {
    fn endpoint_url(&self) -> String {
        format!("{}/playergamelog?{}&{}&{}&{}", NBA_BASE_URL, self.player_id, self.season, self.season_type, self.league_id)
    }
}

impl NBAEndpoint for CommonAllPlayers {
    fn endpoint_url(&self) -> String {
        format!("{}/commonallplayers?{}&{}&{}", NBA_BASE_URL, self.league_id, self.season, self.current_only)
    }
}

impl PlayerGameLog {
    pub fn new(player_id: PlayerID, season: Season, season_type: SeasonType) -> Self {
        PlayerGameLog { player_id, season, season_type, league_id: Default::default() }
    }

    /// The season's game log, or `None` when the API has no games for the player.
    pub fn fetch(&self) -> Result<Option<DataFrame>> {
        let mut frames = self.load_dataframes()?;
        let game_log = frames.remove("PlayerGameLog");
        Ok(game_log.filter(|df| df.height() > 0))
    }
}

impl CommonAllPlayers {
    pub fn new(season: Season) -> Self {
        CommonAllPlayers { league_id: Default::default(), season, current_only: Default::default() }
    }

    pub fn search(&self, name: &str) -> Result<Vec<PlayerMatch>> {
        let frames = self.load_dataframes()?;
        let players = frames.get("CommonAllPlayers")
            .ok_or_else(|| anyhow!("commonallplayers response has no CommonAllPlayers result set"))?;
        search_players(players, name)
    }
}

/// Case-insensitive substring match on the display name.
pub fn search_players(players: &DataFrame, name: &str) -> Result<Vec<PlayerMatch>> {
    let needle = name.to_lowercase();
    let ids = string_column(players, "PERSON_ID")?;
    let names = string_column(players, "DISPLAY_FIRST_LAST")?;
    let teams = string_column(players, "TEAM_ABBREVIATION")?;
    let from_years = string_column(players, "FROM_YEAR")?;
    let to_years = string_column(players, "TO_YEAR")?;

    let mut matches = Vec::new();
    for i in 0..players.height() {
        let display_name = names[i].clone().unwrap_or_default();
        if !display_name.to_lowercase().contains(&needle) {
            continue;
        }
        matches.push(PlayerMatch {
            id: ids[i].clone().unwrap_or_default(),
            name: display_name,
            team: teams[i].clone().unwrap_or_default(),
            years: format!("{} - {}", from_years[i].clone().unwrap_or_default(), to_years[i].clone().unwrap_or_default()),
        });
    }
    Ok(matches)
}

/// Reads a column as optional strings, casting whatever dtype it has.
pub fn string_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Converts every `resultSets` entry of a stats response into a dataframe keyed by its name.
pub fn result_sets_to_frames(endpoint_json: &Value) -> Result<HashMap<String, DataFrame>> {
    let result_sets = endpoint_json["resultSets"].as_array()
        .ok_or_else(|| anyhow!("stats response has no resultSets array"))?;
    let mut stats_dataframes: HashMap<String, DataFrame> = HashMap::new();
    for data_set in result_sets {
        let data_set_name = data_set["name"].as_str()
            .ok_or_else(|| anyhow!("result set without a name"))?;
        let frame = result_set_frame(data_set)
            .with_context(|| format!("failed to load result set {}", data_set_name))?;
        stats_dataframes.insert(data_set_name.to_string(), frame);
    }
    Ok(stats_dataframes)
}

fn result_set_frame(data_set: &Value) -> Result<DataFrame> {
    let headers = data_set["headers"].as_array().ok_or_else(|| anyhow!("missing headers"))?;
    let rows = data_set["rowSet"].as_array().ok_or_else(|| anyhow!("missing rowSet"))?;
    let mut df_series: Vec<Series> = Vec::with_capacity(headers.len());
    for (pos, header) in headers.iter().enumerate() {
        let col_name = header.as_str().ok_or_else(|| anyhow!("non-string header at {}", pos))?;
        let json_values: Vec<&Value> = rows.iter()
            .map(|r| r.get(pos).unwrap_or(&Value::Null))
            .collect();
        df_series.push(json_column(col_name, &json_values));
    }
    Ok(DataFrame::new(df_series)?)
}

// Integers stay integers unless any value in the column is fractional.
fn json_column(col_name: &str, json_values: &[&Value]) -> Series {
    let mut non_null = json_values.iter().filter(|v| !v.is_null());
    if non_null.clone().all(|v| v.is_i64() || v.is_u64()) {
        let typed_data = json_values.iter().map(|v| v.as_i64()).collect::<Vec<Option<i64>>>();
        Series::new(col_name, typed_data)
    } else if non_null.all(|v| v.is_number()) {
        let typed_data = json_values.iter().map(|v| v.as_f64()).collect::<Vec<Option<f64>>>();
        Series::new(col_name, typed_data)
    } else {
        let typed_data = json_values.iter().map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }).collect::<Vec<Option<String>>>();
        Series::new(col_name, typed_data)
    }
}

fn fetch_nba_json(endpoint_url: &str) -> Result<Value> {
    debug!("GET {}", endpoint_url);
    let r = ureq::get(endpoint_url)
    .set("Host","stats.nba.com")
    .set("User-Agent","Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:72.0) Gecko/20100101 Firefox/72.0")
    .set("Accept","application/json, text/plain, */*")
    .set("Accept-Language","en-US,en;q=0.5")
    .set("x-nba-stats-origin","stats")
    .set("x-nba-stats-token","true")
    .set("Connection","keep-alive")
    .set("Referer","https://stats.nba.com/")
    .set("Pragma","no-cache")
    .set("Cache-Control","no-cache")
    .timeout(REQUEST_TIMEOUT)
    .call()
    .with_context(|| format!("failed to fetch {}", endpoint_url))?;
    let json = r.into_json()
        .with_context(|| format!("invalid JSON from {}", endpoint_url))?;
    Ok(json)
}
