//! Source-data queries: team metadata, weekly stats and the schedule

use super::{models::*, schema::stat_column, schema::LeagueStore};
use crate::cli::types::{Category, CategoryMap, OwnerCode, Season, TeamId, Week};
use anyhow::Result;
use rusqlite::{params, Connection, Row};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Row counts written by a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub teams: usize,
    pub stats: usize,
    pub matchups: usize,
}

fn stat_select_columns() -> String {
    Category::ALL
        .iter()
        .map(|cat| stat_column(*cat))
        .collect::<Vec<_>>()
        .join(", ")
}

impl LeagueStore {
    /// Insert or update a team's name and owner for one season
    pub fn upsert_team_season(&mut self, team: &TeamSeason) -> Result<()> {
        write_team(&self.conn, team)
    }

    /// Insert a weekly stat row.
    /// Existing rows are only replaced when `force_update` is true; returns
    /// whether anything was written.
    pub fn upsert_weekly_stat(&mut self, stat: &WeeklyTeamStat, force_update: bool) -> Result<bool> {
        write_stat(&self.conn, stat, force_update)
    }

    pub fn upsert_matchup(&mut self, matchup: &ScheduledMatchup) -> Result<()> {
        write_matchup(&self.conn, matchup)
    }

    /// Write a whole import document in one transaction.
    /// Stat rows always replace existing ones.
    pub fn import(&mut self, doc: &LeagueImport) -> Result<ImportSummary> {
        let tx = self.conn.transaction()?;
        let mut summary = ImportSummary::default();
        for team in &doc.teams {
            write_team(&tx, team)?;
            summary.teams += 1;
        }
        for stat in &doc.stats {
            write_stat(&tx, stat, true)?;
            summary.stats += 1;
        }
        for matchup in &doc.matchups {
            write_matchup(&tx, matchup)?;
            summary.matchups += 1;
        }
        tx.commit()?;

        info!(
            teams = summary.teams,
            stats = summary.stats,
            matchups = summary.matchups,
            "imported league data"
        );
        Ok(summary)
    }

    /// All team-season rows, optionally for one season
    pub fn team_seasons(&self, season: Option<Season>) -> Result<Vec<TeamSeason>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, team_id, team_name, owner_code FROM team_seasons
             WHERE (?1 IS NULL OR season = ?1)
             ORDER BY season, team_id",
        )?;
        let rows = stmt.query_map(params![season.map(|s| s.as_u16())], |row| {
            Ok(TeamSeason {
                season: Season::new(row.get(0)?),
                team_id: TeamId::new(row.get(1)?),
                team_name: row.get(2)?,
                owner_code: row.get::<_, Option<String>>(3)?.map(OwnerCode::new),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn weekly_stats_for_season(&self, season: Season) -> Result<Vec<WeeklyTeamStat>> {
        self.select_stats("WHERE season = ?1", params![season.as_u16()])
    }

    pub fn weekly_stats_for_week(&self, season: Season, week: Week) -> Result<Vec<WeeklyTeamStat>> {
        self.select_stats(
            "WHERE season = ?1 AND week = ?2",
            params![season.as_u16(), week.as_u16()],
        )
    }

    fn select_stats(&self, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<WeeklyTeamStat>> {
        let sql = format!(
            "SELECT season, week, team_id, {}, completed FROM weekly_team_stats {} ORDER BY week, team_id",
            stat_select_columns(),
            filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(args, |row| self.row_to_weekly_stat(row))?;
        let stats = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(rows = stats.len(), filter, "loaded weekly stats");
        Ok(stats)
    }

    /// Helper to convert a database row to WeeklyTeamStat
    fn row_to_weekly_stat(&self, row: &Row) -> rusqlite::Result<WeeklyTeamStat> {
        let mut values = CategoryMap::<Option<f64>>::default();
        for (i, cat) in Category::ALL.iter().enumerate() {
            values[*cat] = row.get(3 + i)?;
        }
        Ok(WeeklyTeamStat {
            season: Season::new(row.get(0)?),
            week: Week::new(row.get(1)?),
            team_id: TeamId::new(row.get(2)?),
            values,
            completed: row.get(3 + Category::ALL.len())?,
        })
    }

    pub fn matchups_for_season(&self, season: Season) -> Result<Vec<ScheduledMatchup>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, week, home_team_id, away_team_id FROM matchups
             WHERE season = ? ORDER BY week, home_team_id, away_team_id",
        )?;
        let rows = stmt.query_map(params![season.as_u16()], |row| {
            Ok(ScheduledMatchup {
                season: Season::new(row.get(0)?),
                week: Week::new(row.get(1)?),
                home_team_id: TeamId::new(row.get(2)?),
                away_team_id: TeamId::new(row.get(3)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Seasons with any source data, ascending
    pub fn list_seasons(&self) -> Result<Vec<Season>> {
        let mut stmt = self.conn.prepare(
            "SELECT season FROM weekly_team_stats
             UNION SELECT season FROM team_seasons
             ORDER BY season",
        )?;
        let rows = stmt.query_map([], |row| Ok(Season::new(row.get(0)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Weeks with stat rows in `season`, ascending
    pub fn list_weeks(&self, season: Season) -> Result<Vec<Week>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT week FROM weekly_team_stats WHERE season = ? ORDER BY week")?;
        let rows = stmt.query_map(params![season.as_u16()], |row| Ok(Week::new(row.get(0)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Everything needed to compute one season
    pub fn load_season(&self, season: Season) -> Result<SeasonData> {
        Ok(SeasonData {
            season,
            teams: self.team_seasons(Some(season))?,
            stats: self.weekly_stats_for_season(season)?,
            matchups: self.matchups_for_season(season)?,
        })
    }

    /// Remove all source and aggregate data
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM weekly_team_stats;
             DELETE FROM matchups;
             DELETE FROM team_seasons;
             DELETE FROM season_power_agg;
             DELETE FROM team_history_agg;
             DELETE FROM opponent_matrix_agg;
             DELETE FROM aggregate_builds;",
        )?;
        Ok(())
    }
}

fn write_team(conn: &Connection, team: &TeamSeason) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO team_seasons (season, team_id, team_name, owner_code)
         VALUES (?, ?, ?, ?)",
        params![
            team.season.as_u16(),
            team.team_id.as_u32(),
            team.team_name,
            team.owner_code.as_ref().map(|o| o.as_str())
        ],
    )?;
    Ok(())
}

/// Only updates an existing row if `replace` is true; keeps the original
/// `created_at` either way
fn write_stat(conn: &Connection, stat: &WeeklyTeamStat, replace: bool) -> Result<bool> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    let verb = if replace {
        "INSERT OR REPLACE"
    } else {
        "INSERT OR IGNORE"
    };
    let sql = format!(
        "{verb} INTO weekly_team_stats
         (season, week, team_id, {}, completed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                 COALESCE((SELECT created_at FROM weekly_team_stats
                           WHERE season = ?1 AND week = ?2 AND team_id = ?3), ?14), ?14)",
        stat_select_columns()
    );

    let v = &stat.values;
    let rows_affected = conn.execute(
        &sql,
        params![
            stat.season.as_u16(),
            stat.week.as_u16(),
            stat.team_id.as_u32(),
            v[Category::FgPct],
            v[Category::FtPct],
            v[Category::ThreePm],
            v[Category::Reb],
            v[Category::Ast],
            v[Category::Stl],
            v[Category::Blk],
            v[Category::Dd],
            v[Category::Pts],
            stat.completed,
            now
        ],
    )?;
    Ok(rows_affected > 0)
}

/// Pairings are stored lower team id first, so a game listed from both
/// sides lands on the same primary key.
fn write_matchup(conn: &Connection, matchup: &ScheduledMatchup) -> Result<()> {
    let (first, second) = matchup.ordered_pair();
    conn.execute(
        "INSERT OR IGNORE INTO matchups (season, week, home_team_id, away_team_id)
         VALUES (?, ?, ?, ?)",
        params![
            matchup.season.as_u16(),
            matchup.week.as_u16(),
            first.as_u32(),
            second.as_u32()
        ],
    )?;
    Ok(())
}
