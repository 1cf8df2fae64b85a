//! Materialized aggregate tables.
//!
//! Each family is stored per season. A save replaces every row of that
//! (family, season) in one transaction together with its `aggregate_builds`
//! marker, so readers see either the old aggregate or the new one. A load
//! returns `None` when the family was never built for the season, which is
//! different from a build that produced zero rows.

use super::schema::LeagueStore;
use crate::analytics::{
    history::{TeamHistory, TeamHistoryEntry},
    opponents::OpponentSeasonRecord,
    power::SeasonPowerRow,
};
use crate::cli::types::{Season, TeamId, Week};
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// One materialized aggregate family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFamily {
    SeasonPower,
    TeamHistory,
    OpponentMatrix,
}

impl AggregateFamily {
    pub const ALL: [AggregateFamily; 3] = [
        AggregateFamily::SeasonPower,
        AggregateFamily::TeamHistory,
        AggregateFamily::OpponentMatrix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFamily::SeasonPower => "season_power",
            AggregateFamily::TeamHistory => "team_history",
            AggregateFamily::OpponentMatrix => "opponent_matrix",
        }
    }

    fn table(&self) -> &'static str {
        match self {
            AggregateFamily::SeasonPower => "season_power_agg",
            AggregateFamily::TeamHistory => "team_history_agg",
            AggregateFamily::OpponentMatrix => "opponent_matrix_agg",
        }
    }
}

impl fmt::Display for AggregateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a (family, season) aggregate was last built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBuild {
    pub family: String,
    pub season: Season,
    pub row_count: usize,
    pub built_at: u64,
}

/// Delete the old rows and record the build; the caller inserts new rows
/// into the same transaction before committing
fn begin_replace(tx: &Transaction, family: AggregateFamily, season: Season, row_count: usize) -> Result<()> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    tx.execute(
        &format!("DELETE FROM {} WHERE season = ?", family.table()),
        params![season.as_u16()],
    )?;
    tx.execute(
        "INSERT OR REPLACE INTO aggregate_builds (family, season, row_count, built_at)
         VALUES (?, ?, ?, ?)",
        params![family.as_str(), season.as_u16(), row_count as i64, now],
    )?;
    Ok(())
}

impl LeagueStore {
    pub fn has_aggregate(&self, family: AggregateFamily, season: Season) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM aggregate_builds WHERE family = ? AND season = ?",
                params![family.as_str(), season.as_u16()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// All build markers, ordered by family then season
    pub fn aggregate_builds(&self) -> Result<Vec<AggregateBuild>> {
        let mut stmt = self.conn.prepare(
            "SELECT family, season, row_count, built_at FROM aggregate_builds
             ORDER BY family, season",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AggregateBuild {
                family: row.get(0)?,
                season: Season::new(row.get(1)?),
                row_count: row.get::<_, i64>(2)? as usize,
                built_at: row.get::<_, i64>(3)? as u64,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn replace_season_power(&mut self, season: Season, rows: &[SeasonPowerRow]) -> Result<()> {
        let tx = self.conn.transaction()?;
        begin_replace(&tx, AggregateFamily::SeasonPower, season, rows.len())?;
        for row in rows {
            tx.execute(
                "INSERT INTO season_power_agg
                 (season, team_id, team_name, rank, weeks_played, avg_total_z, sum_total_z,
                  per_category_avg_z, per_category_rank, luck)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    season.as_u16(),
                    row.team_id.as_u32(),
                    row.team_name,
                    row.rank,
                    row.weeks_played,
                    row.avg_total_z,
                    row.sum_total_z,
                    serde_json::to_string(&row.per_category_avg_z)?,
                    serde_json::to_string(&row.per_category_rank)?,
                    serde_json::to_string(&row.luck)?
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Rows ordered by rank then team id
    pub fn load_season_power(&self, season: Season) -> Result<Option<Vec<SeasonPowerRow>>> {
        if !self.has_aggregate(AggregateFamily::SeasonPower, season)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT team_id, team_name, rank, weeks_played, avg_total_z, sum_total_z,
                    per_category_avg_z, per_category_rank, luck
             FROM season_power_agg WHERE season = ?
             ORDER BY rank, team_id",
        )?;
        let raw = stmt.query_map(params![season.as_u16()], |row| {
            Ok((
                SeasonPowerRow {
                    team_id: TeamId::new(row.get(0)?),
                    team_name: row.get(1)?,
                    rank: row.get(2)?,
                    weeks_played: row.get(3)?,
                    avg_total_z: row.get(4)?,
                    sum_total_z: row.get(5)?,
                    per_category_avg_z: Default::default(),
                    per_category_rank: Default::default(),
                    luck: Default::default(),
                },
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut rows = Vec::new();
        for item in raw {
            let (mut row, avg_z, ranks, luck) = item?;
            row.per_category_avg_z = serde_json::from_str(&avg_z)?;
            row.per_category_rank = serde_json::from_str(&ranks)?;
            row.luck = serde_json::from_str(&luck)?;
            rows.push(row);
        }
        Ok(Some(rows))
    }

    pub fn replace_team_histories(&mut self, season: Season, histories: &[TeamHistory]) -> Result<()> {
        let entry_count = histories.iter().map(|h| h.entries.len()).sum();
        let tx = self.conn.transaction()?;
        begin_replace(&tx, AggregateFamily::TeamHistory, season, entry_count)?;
        for history in histories {
            for entry in &history.entries {
                tx.execute(
                    "INSERT INTO team_history_agg
                     (season, team_id, team_name, week, rank, total_z, cumulative_total_z,
                      league_average_total_z, zscores, stats, league_average_zscores)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        season.as_u16(),
                        history.team_id.as_u32(),
                        history.team_name,
                        entry.week.as_u16(),
                        entry.rank,
                        entry.total_z,
                        entry.cumulative_total_z,
                        entry.league_average_total_z,
                        serde_json::to_string(&entry.zscores)?,
                        serde_json::to_string(&entry.stats)?,
                        serde_json::to_string(&entry.league_average_zscores)?
                    ],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Histories ordered by team id, entries by week
    pub fn load_team_histories(&self, season: Season) -> Result<Option<Vec<TeamHistory>>> {
        if !self.has_aggregate(AggregateFamily::TeamHistory, season)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT team_id, team_name, week, rank, total_z, cumulative_total_z,
                    league_average_total_z, zscores, stats, league_average_zscores
             FROM team_history_agg WHERE season = ?
             ORDER BY team_id, week",
        )?;
        let raw = stmt.query_map(params![season.as_u16()], |row| {
            Ok((
                TeamId::new(row.get(0)?),
                row.get::<_, Option<String>>(1)?,
                Week::new(row.get(2)?),
                row.get::<_, u32>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
            ))
        })?;

        let mut histories: BTreeMap<TeamId, TeamHistory> = BTreeMap::new();
        for item in raw {
            let (team_id, team_name, week, rank, total_z, cumulative, avg_total, zscores, stats, avg_z) = item?;
            let history = histories
                .entry(team_id)
                .or_insert_with(|| TeamHistory::empty(season, team_id));
            history.team_name = team_name;
            history.entries.push(TeamHistoryEntry {
                week,
                rank,
                total_z,
                cumulative_total_z: cumulative,
                zscores: serde_json::from_str(&zscores)?,
                stats: serde_json::from_str(&stats)?,
                league_average_total_z: avg_total,
                league_average_zscores: serde_json::from_str(&avg_z)?,
            });
        }
        Ok(Some(histories.into_values().collect()))
    }

    pub fn replace_opponent_records(&mut self, season: Season, records: &[OpponentSeasonRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;
        begin_replace(&tx, AggregateFamily::OpponentMatrix, season, records.len())?;
        for record in records {
            tx.execute(
                "INSERT INTO opponent_matrix_agg
                 (season, team_id, opponent_team_id, opponent_name, matchups, wins, losses, ties, categories)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    season.as_u16(),
                    record.team_id.as_u32(),
                    record.opponent_team_id.as_u32(),
                    record.opponent_name,
                    record.matchups,
                    record.wins,
                    record.losses,
                    record.ties,
                    serde_json::to_string(&record.categories)?
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Records ordered by team id then opponent id
    pub fn load_opponent_records(&self, season: Season) -> Result<Option<Vec<OpponentSeasonRecord>>> {
        if !self.has_aggregate(AggregateFamily::OpponentMatrix, season)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT team_id, opponent_team_id, opponent_name, matchups, wins, losses, ties, categories
             FROM opponent_matrix_agg WHERE season = ?
             ORDER BY team_id, opponent_team_id",
        )?;
        let raw = stmt.query_map(params![season.as_u16()], |row| {
            Ok((
                OpponentSeasonRecord {
                    season,
                    team_id: TeamId::new(row.get(0)?),
                    opponent_team_id: TeamId::new(row.get(1)?),
                    opponent_name: row.get(2)?,
                    matchups: row.get(3)?,
                    wins: row.get(4)?,
                    losses: row.get(5)?,
                    ties: row.get(6)?,
                    categories: Default::default(),
                },
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut records = Vec::new();
        for item in raw {
            let (mut record, categories) = item?;
            record.categories = serde_json::from_str(&categories)?;
            records.push(record);
        }
        Ok(Some(records))
    }
}
