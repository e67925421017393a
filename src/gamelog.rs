//! Fetches game logs per player, trims them to a date window and stacks them into one table.

use std::{fs, path::Path, thread, time::{Duration, Instant}};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use polars::prelude::*;
use tabled::Tabled;

use crate::config::Subject;
use crate::nba::endpoints::PlayerGameLog;
use crate::nba::params::{PlayerID, Season, SeasonType};

pub const GAME_DATE: &str = "GAME_DATE";
pub const PLAYER: &str = "Player";

/// Where game logs come from.
pub trait GameLogSource {
    /// `Ok(None)` when the player has no games in the season.
    fn player_game_log(&self, player_id: &str, season: &Season, season_type: SeasonType) -> Result<Option<DataFrame>>;
}

/// The live stats.nba.com API.
pub struct StatsApi;

impl GameLogSource for StatsApi {
    fn player_game_log(&self, player_id: &str, season: &Season, season_type: SeasonType) -> Result<Option<DataFrame>> {
        PlayerGameLog::new(PlayerID::ID(player_id.to_string()), season.clone(), season_type).fetch()
    }
}

/// Closed date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("date range start {} is after end {}", start, end);
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub struct ExportRequest<'a> {
    pub players: &'a [Subject],
    pub range: DateRange,
    pub season: &'a Season,
    pub season_type: SeasonType,
    /// Pause between players to stay under the API rate limit.
    pub delay: Duration,
}

#[derive(Tabled, Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub player: String,
    pub season_games: usize,
    pub games_in_range: usize,
}

pub struct CombinedTable {
    pub frame: DataFrame,
    pub summary: Vec<PlayerSummary>,
}

/// Parses the date formats the stats API and spreadsheets produce.
pub fn normalize_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    const DATE_FORMATS: [&str; 4] = ["%b %d, %Y", "%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Rewrites `GAME_DATE` as `YYYY-MM-DD`, keeps rows inside `range` and tags them with `player`.
pub fn filter_game_log(mut frame: DataFrame, range: DateRange, player: &str) -> Result<DataFrame> {
    let dates: Vec<Option<NaiveDate>> = frame
        .column(GAME_DATE)?
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|raw| raw.and_then(normalize_game_date))
        .collect();

    let unparsed = dates.iter().filter(|d| d.is_none()).count();
    if unparsed > 0 {
        debug!("{}: dropping {} rows with unreadable {}", player, unparsed, GAME_DATE);
    }

    let normalized = dates
        .iter()
        .map(|d| d.map(|d| d.format("%Y-%m-%d").to_string()))
        .collect::<Vec<Option<String>>>();
    frame.with_column(Series::new(GAME_DATE, normalized))?;

    let in_range = dates
        .iter()
        .map(|d| d.map_or(false, |d| range.contains(d)))
        .collect::<Vec<bool>>();
    let mut filtered = frame.filter(&BooleanChunked::from_slice("in_range", &in_range))?;

    let tags = vec![player; filtered.height()];
    filtered.with_column(Series::new(PLAYER, tags))?;
    Ok(filtered)
}

/// Fetches every player in order and stacks the filtered rows. Any fetch error aborts the run.
pub fn build_combined_table<S>(source: &S, request: &ExportRequest) -> Result<CombinedTable>
where
    S: GameLogSource + ?Sized,
{
    let mut combined: Option<DataFrame> = None;
    let mut summary = Vec::with_capacity(request.players.len());

    for (pos, subject) in request.players.iter().enumerate() {
        if pos > 0 && !request.delay.is_zero() {
            thread::sleep(request.delay);
        }

        info!("Fetching game logs for {}...", subject.name);
        let fetch_start = Instant::now();
        let game_log = source
            .player_game_log(&subject.id, request.season, request.season_type)
            .with_context(|| format!("failed to fetch game log for {} ({})", subject.name, subject.id))?;
        debug!("{} fetched in {:?}", subject.name, fetch_start.elapsed());

        let game_log = match game_log {
            Some(frame) => frame,
            None => {
                info!("No games for {} in {}", subject.name, request.season.as_str());
                summary.push(PlayerSummary { player: subject.name.clone(), season_games: 0, games_in_range: 0 });
                continue;
            }
        };

        let season_games = game_log.height();
        let filtered = filter_game_log(game_log, request.range, &subject.name)
            .with_context(|| format!("failed to filter game log for {}", subject.name))?;
        summary.push(PlayerSummary {
            player: subject.name.clone(),
            season_games,
            games_in_range: filtered.height(),
        });

        combined = Some(match combined {
            None => filtered,
            Some(acc) => stack(acc, filtered)
                .with_context(|| format!("failed to append rows for {}", subject.name))?,
        });
    }

    Ok(CombinedTable {
        frame: combined.unwrap_or_default(),
        summary,
    })
}

fn stack(mut acc: DataFrame, mut next: DataFrame) -> PolarsResult<DataFrame> {
    unify_dtypes(&mut acc, &mut next)?;
    acc.vstack_mut(&next)?;
    Ok(acc)
}

// Inference is per response, so the same column can come back Int64 for one player and
// Float64 for another.
fn unify_dtypes(acc: &mut DataFrame, next: &mut DataFrame) -> PolarsResult<()> {
    let names: Vec<String> = acc.get_column_names().iter().map(|s| s.to_string()).collect();
    for name in names {
        let left = acc.column(&name)?.dtype().clone();
        let right = next.column(&name)?.dtype().clone();
        if left == right {
            continue;
        }
        let target = if left.is_numeric() && right.is_numeric() {
            DataType::Float64
        } else {
            DataType::String
        };
        let widened = acc.column(&name)?.cast(&target)?;
        acc.with_column(widened)?;
        let widened = next.column(&name)?.cast(&target)?;
        next.with_column(widened)?;
    }
    Ok(())
}

/// Writes the table with a header row. A table without columns becomes an empty file.
pub fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    if frame.width() == 0 {
        fs::write(path, "")?;
        return Ok(());
    }
    let mut file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)?;
    Ok(())
}
