//! Three-stage regional: two 16-team Swiss groups, a 16-team Swiss playoff,
//! then an eight-team double-elimination bracket.

use std::collections::BTreeMap;
use std::fmt;

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RegionalConfig;
use crate::constants::{regional_points, DOUBLE_ELIM_TEAM_COUNT, REGIONAL_TEAM_COUNT};
use crate::double_elim::DoubleEliminationBracket;
use crate::error::{TournamentError, TournamentResult};
use crate::swiss::SwissBracket;

/// Teams each group sends to the playoff
const GROUP_ADVANCERS: usize = 8;

/// First placement of the band for teams knocked out in the groups
const GROUP_BAND_START: u32 = 17;

/// First placement of the band for teams knocked out in the playoff
const PLAYOFF_BAND_START: u32 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SwissGroups,
    SwissPlayoffs,
    DoubleElim,
    Complete,
}

impl Stage {
    /// Display name for standings screens
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::SwissGroups => "Swiss Stage - Groups",
            Stage::SwissPlayoffs => "Swiss Stage - Playoffs",
            Stage::DoubleElim => "Playoff Bracket",
            Stage::Complete => "Complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::SwissGroups => "swiss_groups",
            Stage::SwissPlayoffs => "swiss_playoffs",
            Stage::DoubleElim => "double_elim",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Final standings row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalSummaryEntry {
    pub team_id: String,
    pub placement: u32,
    pub points: u32,
}

/// One regional event, from group draw to final placements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionalTournament {
    teams: Vec<String>,
    config: RegionalConfig,
    stage: Stage,
    group_a: SwissBracket,
    group_b: SwissBracket,
    playoffs: Option<SwissBracket>,
    double_elim: Option<DoubleEliminationBracket>,
    final_placements: BTreeMap<String, u32>,
    points: BTreeMap<String, u32>,
}

impl RegionalTournament {
    /// Draw a regional with the default ruleset.
    pub fn new<R: Rng + ?Sized>(teams: Vec<String>, rng: &mut R) -> TournamentResult<Self> {
        Self::with_config(teams, RegionalConfig::default(), rng)
    }

    /// Shuffle the 32 entrants into two Swiss groups of 16.
    pub fn with_config<R: Rng + ?Sized>(
        teams: Vec<String>,
        config: RegionalConfig,
        rng: &mut R,
    ) -> TournamentResult<Self> {
        if teams.len() != REGIONAL_TEAM_COUNT {
            return Err(TournamentError::InvalidEntrantCount {
                expected: REGIONAL_TEAM_COUNT,
                found: teams.len(),
            });
        }

        let mut shuffled = teams.clone();
        shuffled.shuffle(rng);
        let group_b_teams = shuffled.split_off(REGIONAL_TEAM_COUNT / 2);

        let group_a = SwissBracket::new(shuffled, config.group)?;
        let group_b = SwissBracket::new(group_b_teams, config.group)?;

        Ok(RegionalTournament {
            teams,
            config,
            stage: Stage::SwissGroups,
            group_a,
            group_b,
            playoffs: None,
            double_elim: None,
            final_placements: BTreeMap::new(),
            points: BTreeMap::new(),
        })
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn config(&self) -> &RegionalConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn stage_name(&self) -> &'static str {
        self.stage.display_name()
    }

    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Complete
    }

    pub fn group_a(&self) -> &SwissBracket {
        &self.group_a
    }

    pub fn group_b(&self) -> &SwissBracket {
        &self.group_b
    }

    pub fn playoffs(&self) -> Option<&SwissBracket> {
        self.playoffs.as_ref()
    }

    pub fn double_elim(&self) -> Option<&DoubleEliminationBracket> {
        self.double_elim.as_ref()
    }

    /// Swiss brackets the caller should be playing in the current stage.
    pub fn active_swiss_brackets_mut(&mut self) -> Vec<&mut SwissBracket> {
        match self.stage {
            Stage::SwissGroups => vec![&mut self.group_a, &mut self.group_b],
            Stage::SwissPlayoffs => self.playoffs.iter_mut().collect(),
            Stage::DoubleElim | Stage::Complete => Vec::new(),
        }
    }

    /// The double-elimination bracket while it is being played.
    pub fn double_elim_mut(&mut self) -> Option<&mut DoubleEliminationBracket> {
        match self.stage {
            Stage::DoubleElim => self.double_elim.as_mut(),
            _ => None,
        }
    }

    /// Team id → placement (1-32). 5th-6th and 7th-8th are shared bands.
    pub fn final_placements(&self) -> &BTreeMap<String, u32> {
        &self.final_placements
    }

    /// Team id → regional points
    pub fn points(&self) -> &BTreeMap<String, u32> {
        &self.points
    }

    /// Placed teams sorted by placement.
    pub fn standings_summary(&self) -> Vec<RegionalSummaryEntry> {
        let mut summary: Vec<RegionalSummaryEntry> = self
            .final_placements
            .iter()
            .map(|(team, &placement)| RegionalSummaryEntry {
                team_id: team.clone(),
                placement,
                points: self.points.get(team).copied().unwrap_or(0),
            })
            .collect();
        summary.sort_by(|a, b| a.placement.cmp(&b.placement).then_with(|| a.team_id.cmp(&b.team_id)));
        summary
    }

    fn place(&mut self, team: &str, placement: u32) {
        if self.final_placements.contains_key(team) {
            return;
        }
        self.final_placements.insert(team.to_string(), placement);
        self.points.insert(team.to_string(), regional_points(placement));
    }

    /// Move to the next stage once the current one has finished.
    pub fn advance_stage(&mut self) -> TournamentResult<Stage> {
        match self.stage {
            Stage::SwissGroups => self.finish_groups()?,
            Stage::SwissPlayoffs => self.finish_playoffs()?,
            Stage::DoubleElim => self.finish_double_elim()?,
            Stage::Complete => return Err(TournamentError::AlreadyComplete),
        }
        info!("Regional advanced to {}", self.stage.display_name());
        Ok(self.stage)
    }

    /// Top eight of each group meet in an interleaved playoff (A1, B1, A2, B2, ...).
    /// Everyone else lands in the 17-32 band.
    fn finish_groups(&mut self) -> TournamentResult<()> {
        if !(self.group_a.is_complete() && self.group_b.is_complete()) {
            return Err(TournamentError::StageNotComplete(Stage::SwissGroups));
        }

        let seeds_a = self.group_a.top_seeds(GROUP_ADVANCERS);
        let seeds_b = self.group_b.top_seeds(GROUP_ADVANCERS);

        let mut knocked_out = knocked_out_teams(&self.group_a, &seeds_a);
        knocked_out.extend(knocked_out_teams(&self.group_b, &seeds_b));
        for (i, team) in knocked_out.iter().enumerate() {
            let placement = (GROUP_BAND_START + i as u32).min(REGIONAL_TEAM_COUNT as u32);
            self.place(team, placement);
        }

        let mut playoff_teams = Vec::with_capacity(seeds_a.len() + seeds_b.len());
        for i in 0..seeds_a.len().max(seeds_b.len()) {
            playoff_teams.extend(seeds_a.get(i).cloned());
            playoff_teams.extend(seeds_b.get(i).cloned());
        }

        self.playoffs = Some(SwissBracket::new(playoff_teams, self.config.playoff)?);
        self.stage = Stage::SwissPlayoffs;
        Ok(())
    }

    /// Top eight of the playoff seed the double-elimination bracket. The rest
    /// take 9th-16th, later eliminations ranking higher.
    fn finish_playoffs(&mut self) -> TournamentResult<()> {
        let playoffs = match &self.playoffs {
            Some(bracket) if bracket.is_complete() => bracket,
            _ => return Err(TournamentError::StageNotComplete(Stage::SwissPlayoffs)),
        };

        let seeds = playoffs.top_seeds(DOUBLE_ELIM_TEAM_COUNT);

        // Qualified teams that missed the cut outrank every eliminated team
        let mut knocked_out: Vec<String> = playoffs
            .get_qualified_seeded()
            .into_iter()
            .filter(|t| !seeds.contains(t))
            .collect();
        knocked_out.extend(
            playoffs
                .eliminated()
                .iter()
                .rev()
                .filter(|t| !seeds.contains(t))
                .cloned(),
        );
        for team in playoffs.team_ids() {
            if !seeds.contains(team) && !knocked_out.contains(team) {
                knocked_out.push(team.clone());
            }
        }

        let bracket = DoubleEliminationBracket::new(seeds, self.config.double_elim_best_of)?;

        for (i, team) in knocked_out.iter().enumerate() {
            self.place(team, PLAYOFF_BAND_START + i as u32);
        }
        self.double_elim = Some(bracket);
        self.stage = Stage::DoubleElim;
        Ok(())
    }

    fn finish_double_elim(&mut self) -> TournamentResult<()> {
        let placements: Vec<(String, u32)> = match &self.double_elim {
            Some(bracket) if bracket.is_complete() => bracket
                .placements()
                .iter()
                .flat_map(|(&place, teams)| teams.iter().map(move |t| (t.clone(), place)))
                .collect(),
            _ => return Err(TournamentError::StageNotComplete(Stage::DoubleElim)),
        };

        for (team, place) in placements {
            self.place(&team, place);
        }
        self.stage = Stage::Complete;
        Ok(())
    }
}

/// Teams of a finished Swiss bracket that did not make `seeds`: eliminated
/// teams in elimination order, then anyone else in standings order.
fn knocked_out_teams(bracket: &SwissBracket, seeds: &[String]) -> Vec<String> {
    let mut out: Vec<String> = bracket
        .eliminated()
        .iter()
        .filter(|t| !seeds.contains(t))
        .cloned()
        .collect();
    for record in bracket.get_standings() {
        if !seeds.contains(&record.team_id) && !out.contains(&record.team_id) {
            out.push(record.team_id.clone());
        }
    }
    out
}
