//! Cross-season owner continuity.
//!
//! Team ids are only meaningful within a season, so "the same franchise"
//! across seasons is resolved through owner codes. The index is a flat arena
//! of `TeamSeason` rows plus maps of arena positions; nothing points at
//! anything else.

use std::collections::HashMap;

use crate::{
    cli::types::{OwnerCode, Season, TeamId},
    storage::models::TeamSeason,
};

/// A stable owner identity across seasons.
pub type OwnerIdentity = OwnerCode;

/// One `(season, team_id)` slot
pub type SeasonTeam = (Season, TeamId);

#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    rows: Vec<TeamSeason>,
    by_slot: HashMap<SeasonTeam, usize>,
    /// Arena positions per team id, ascending by season.
    by_team: HashMap<TeamId, Vec<usize>>,
    /// Arena positions per owner, ascending by season then team id.
    by_owner: HashMap<OwnerIdentity, Vec<usize>>,
    latest_season: Option<Season>,
}

impl OwnershipIndex {
    pub fn build(rows: impl IntoIterator<Item = TeamSeason>) -> Self {
        let mut rows: Vec<TeamSeason> = rows.into_iter().collect();
        rows.sort_by_key(|r| (r.season, r.team_id));
        rows.dedup_by_key(|r| (r.season, r.team_id));

        let mut index = Self {
            latest_season: rows.last().map(|r| r.season),
            ..Self::default()
        };
        for (pos, row) in rows.iter().enumerate() {
            index.by_slot.insert((row.season, row.team_id), pos);
            index.by_team.entry(row.team_id).or_default().push(pos);
            if let Some(owner) = &row.owner_code {
                index.by_owner.entry(owner.clone()).or_default().push(pos);
            }
        }
        index.rows = rows;
        index
    }

    pub fn latest_season(&self) -> Option<Season> {
        self.latest_season
    }

    pub fn row(&self, team_id: TeamId, season: Season) -> Option<&TeamSeason> {
        self.by_slot.get(&(season, team_id)).map(|&pos| &self.rows[pos])
    }

    pub fn owner_of(&self, team_id: TeamId, season: Season) -> Option<&OwnerIdentity> {
        self.row(team_id, season).and_then(|r| r.owner_code.as_ref())
    }

    /// Name from the most recent season the team id exists in.
    pub fn latest_team_name(&self, team_id: TeamId) -> Option<&str> {
        self.by_team
            .get(&team_id)
            .and_then(|positions| positions.last())
            .map(|&pos| self.rows[pos].team_name.as_str())
    }

    /// Trailing run of consecutive seasons, ending at the team's latest
    /// season, held by the same owner as that latest season. Ascending.
    pub fn team_current_era(&self, team_id: TeamId) -> Vec<SeasonTeam> {
        let Some(positions) = self.by_team.get(&team_id) else {
            return Vec::new();
        };
        let Some(latest) = positions.last().map(|&pos| &self.rows[pos]) else {
            return Vec::new();
        };
        let Some(owner) = latest.owner_code.as_ref() else {
            return Vec::new();
        };

        let mut era = Vec::new();
        let mut expected = latest.season;
        for row in positions.iter().rev().map(|&pos| &self.rows[pos]) {
            if row.season != expected || row.owner_code.as_ref() != Some(owner) {
                break;
            }
            era.push((row.season, row.team_id));
            match expected.as_u16().checked_sub(1) {
                Some(prev) => expected = Season::new(prev),
                None => break,
            }
        }
        era.reverse();
        era
    }

    /// Trailing run of consecutive seasons, ending at the league's latest
    /// season, in which `owner` held a team. Ascending.
    ///
    /// Empty when the owner holds no team in the latest season.
    pub fn owner_current_era(&self, owner: &OwnerIdentity) -> Vec<SeasonTeam> {
        let (Some(positions), Some(latest)) = (self.by_owner.get(owner), self.latest_season) else {
            return Vec::new();
        };

        let mut era = Vec::new();
        let mut expected = latest;
        let mut seen_expected = false;
        for row in positions.iter().rev().map(|&pos| &self.rows[pos]) {
            if row.season == expected {
                era.push((row.season, row.team_id));
                seen_expected = true;
                continue;
            }
            // Moving on to an earlier season; it must be exactly one back
            if !seen_expected || row.season.as_u16().checked_add(1) != Some(expected.as_u16()) {
                break;
            }
            expected = row.season;
            era.push((row.season, row.team_id));
        }
        era.reverse();
        era
    }

    /// Every `(season, team_id)` the owner ever held. Ascending.
    pub fn owner_seasons(&self, owner: &OwnerIdentity) -> Vec<SeasonTeam> {
        self.by_owner
            .get(owner)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&pos| (self.rows[pos].season, self.rows[pos].team_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}
