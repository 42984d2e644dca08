//! Swiss-system bracket.
//!
//! Teams with the same record are paired each round, avoiding rematches where
//! possible, until every team has either reached the win threshold
//! (qualified) or the loss threshold (eliminated).

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SwissConfig;
use crate::constants::BYE_GAME_WINS;
use crate::error::{BracketError, BracketResult};

/// A team's running record in a Swiss bracket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwissRecord {
    pub team_id: String,
    pub wins: u32,
    pub losses: u32,
    pub game_wins: u32,
    pub game_losses: u32,
    /// Teams already faced
    pub opponents: BTreeSet<String>,
    /// Sum of the current wins of every faced opponent
    pub buchholz: u32,
}

impl SwissRecord {
    pub fn new(team_id: &str) -> Self {
        SwissRecord {
            team_id: team_id.to_string(),
            wins: 0,
            losses: 0,
            game_wins: 0,
            game_losses: 0,
            opponents: BTreeSet::new(),
            buchholz: 0,
        }
    }

    /// "W-L"
    pub fn record_str(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }

    pub fn game_diff(&self) -> i64 {
        self.game_wins as i64 - self.game_losses as i64
    }

    pub fn has_played(&self, team_id: &str) -> bool {
        self.opponents.contains(team_id)
    }

    /// Standings key: wins desc, losses asc, game diff desc, game wins desc
    fn sort_key(&self) -> (Reverse<u32>, u32, Reverse<i64>, Reverse<u32>) {
        (
            Reverse(self.wins),
            self.losses,
            Reverse(self.game_diff()),
            Reverse(self.game_wins),
        )
    }
}

/// One recorded Swiss series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwissMatch {
    pub round: u32,
    pub team1_id: String,
    pub team2_id: String,
    pub team1_games: u32,
    pub team2_games: u32,
    pub winner_id: String,
    pub loser_id: String,
}

/// Standings row handed to collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team_id: String,
    pub wins: u32,
    pub losses: u32,
    pub game_wins: u32,
    pub game_losses: u32,
    pub game_diff: i64,
    pub buchholz: u32,
    pub qualified: bool,
    pub eliminated: bool,
}

/// Swiss-system bracket over a fixed pool of teams.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwissBracket {
    team_ids: Vec<String>,
    config: SwissConfig,
    records: HashMap<String, SwissRecord>,
    rounds: Vec<Vec<(String, String)>>,
    results: Vec<SwissMatch>,
    byes: Vec<String>,
    qualified: Vec<String>,
    eliminated: Vec<String>,
    is_complete: bool,
}

impl SwissBracket {
    /// Build a bracket. Fails on an empty team list.
    pub fn new(team_ids: Vec<String>, config: SwissConfig) -> BracketResult<Self> {
        if team_ids.is_empty() {
            return Err(BracketError::NoTeams);
        }
        let records = team_ids
            .iter()
            .map(|id| (id.clone(), SwissRecord::new(id)))
            .collect();

        Ok(SwissBracket {
            team_ids,
            config,
            records,
            rounds: Vec::new(),
            results: Vec::new(),
            byes: Vec::new(),
            qualified: Vec::new(),
            eliminated: Vec::new(),
            is_complete: false,
        })
    }

    pub fn team_ids(&self) -> &[String] {
        &self.team_ids
    }

    pub fn config(&self) -> &SwissConfig {
        &self.config
    }

    pub fn best_of(&self) -> u32 {
        self.config.best_of
    }

    pub fn record(&self, team_id: &str) -> Option<&SwissRecord> {
        self.records.get(team_id)
    }

    /// Pairings of every round generated so far
    pub fn rounds(&self) -> &[Vec<(String, String)>] {
        &self.rounds
    }

    pub fn current_round(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn results(&self) -> &[SwissMatch] {
        &self.results
    }

    /// Teams granted a bye, once per bye
    pub fn byes(&self) -> &[String] {
        &self.byes
    }

    /// Qualified teams in qualification order
    pub fn qualified(&self) -> &[String] {
        &self.qualified
    }

    /// Eliminated teams in elimination order
    pub fn eliminated(&self) -> &[String] {
        &self.eliminated
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    fn is_qualified(&self, record: &SwissRecord) -> bool {
        record.wins >= self.config.win_threshold
    }

    fn is_eliminated(&self, record: &SwissRecord) -> bool {
        record.losses >= self.config.loss_threshold
    }

    /// Thresholds are checked on every result, so a record below both is
    /// exactly a team still in the bracket.
    fn is_active(&self, team_id: &str) -> bool {
        self.records
            .get(team_id)
            .map_or(false, |r| !self.is_qualified(r) && !self.is_eliminated(r))
    }

    /// Teams neither qualified nor eliminated, in entry order.
    pub fn active_teams(&self) -> Vec<String> {
        self.team_ids
            .iter()
            .filter(|t| self.is_active(t))
            .cloned()
            .collect()
    }

    fn has_played(&self, a: &str, b: &str) -> bool {
        self.records.get(a).map_or(false, |r| r.has_played(b))
    }

    /// Pair the active teams for the next round.
    ///
    /// Groups of equal record are handled best first. Inside a group the
    /// teams are shuffled and paired greedily with opponents they have not
    /// met; whoever is left over drops into the next group. Teams still
    /// unpaired after every group are paired across records, rematching only
    /// when no fresh opponent remains. An odd team out gets a bye.
    pub fn generate_round_matchups<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<(String, String)> {
        let active = self.active_teams();
        if active.len() < 2 {
            if let Some(team) = active.first() {
                self.give_bye(team);
            }
            return Vec::new();
        }

        let mut by_record: BTreeMap<(Reverse<u32>, u32), Vec<String>> = BTreeMap::new();
        for team in &active {
            let record = &self.records[team];
            by_record
                .entry((Reverse(record.wins), record.losses))
                .or_default()
                .push(team.clone());
        }
        let mut groups: Vec<Vec<String>> = by_record.into_values().collect();

        let mut matchups = Vec::new();
        let mut paired: HashSet<String> = HashSet::new();

        for idx in 0..groups.len() {
            let mut group: Vec<String> = std::mem::take(&mut groups[idx])
                .into_iter()
                .filter(|t| !paired.contains(t))
                .collect();
            group.shuffle(rng);

            while group.len() >= 2 {
                let Some(team1) = group.pop() else { break };
                match group.iter().position(|t| !self.has_played(&team1, t)) {
                    Some(pos) => {
                        let opponent = group.remove(pos);
                        paired.insert(team1.clone());
                        paired.insert(opponent.clone());
                        matchups.push((team1, opponent));
                    }
                    None => {
                        group.insert(0, team1);
                        break;
                    }
                }
            }

            if !group.is_empty() {
                if let Some(next) = groups.get_mut(idx + 1) {
                    next.extend(group);
                }
            }
        }

        let mut unpaired: Vec<String> = active.into_iter().filter(|t| !paired.contains(t)).collect();
        unpaired.shuffle(rng);

        while unpaired.len() >= 2 {
            let Some(team1) = unpaired.pop() else { break };
            let opponent = match unpaired.iter().position(|t| !self.has_played(&team1, t)) {
                Some(pos) => unpaired.remove(pos),
                None => {
                    let Some(opponent) = unpaired.pop() else { break };
                    warn!("Swiss round {}: forced rematch {} vs {}", self.rounds.len() + 1, team1, opponent);
                    opponent
                }
            };
            matchups.push((team1, opponent));
        }

        if let Some(team) = unpaired.pop() {
            self.give_bye(&team);
        }

        self.rounds.push(matchups.clone());
        debug!("Swiss round {}: {} matchups", self.rounds.len(), matchups.len());
        matchups
    }

    /// Automatic series win, counted 3-0, with the usual qualification check.
    fn give_bye(&mut self, team_id: &str) {
        if let Some(record) = self.records.get_mut(team_id) {
            record.wins += 1;
            record.game_wins += BYE_GAME_WINS;
        }
        self.byes.push(team_id.to_string());
        info!("Swiss bye for {}", team_id);

        self.check_qualified(team_id);
        self.refresh_buchholz();
        self.update_complete();
    }

    /// Record a series result between two active teams.
    pub fn record_result(
        &mut self,
        team1_id: &str,
        team2_id: &str,
        team1_games: u32,
        team2_games: u32,
    ) -> BracketResult<SwissMatch> {
        if team1_id == team2_id {
            return Err(BracketError::SelfMatch(team1_id.to_string()));
        }
        for team in [team1_id, team2_id] {
            if !self.records.contains_key(team) {
                return Err(BracketError::UnknownTeam(team.to_string()));
            }
            if !self.is_active(team) {
                return Err(BracketError::TeamNotActive(team.to_string()));
            }
        }
        if team1_games == team2_games {
            return Err(BracketError::TiedResult {
                team1: team1_id.to_string(),
                team2: team2_id.to_string(),
            });
        }

        let (winner_id, loser_id) = if team1_games > team2_games {
            (team1_id, team2_id)
        } else {
            (team2_id, team1_id)
        };
        let high = team1_games.max(team2_games);
        let low = team1_games.min(team2_games);

        if let Some(winner) = self.records.get_mut(winner_id) {
            winner.wins += 1;
            winner.game_wins += high;
            winner.game_losses += low;
            winner.opponents.insert(loser_id.to_string());
        }
        if let Some(loser) = self.records.get_mut(loser_id) {
            loser.losses += 1;
            loser.game_wins += low;
            loser.game_losses += high;
            loser.opponents.insert(winner_id.to_string());
        }

        self.check_qualified(winner_id);
        self.check_eliminated(loser_id);
        self.refresh_buchholz();
        self.update_complete();

        let result = SwissMatch {
            round: self.current_round(),
            team1_id: team1_id.to_string(),
            team2_id: team2_id.to_string(),
            team1_games,
            team2_games,
            winner_id: winner_id.to_string(),
            loser_id: loser_id.to_string(),
        };
        self.results.push(result.clone());
        Ok(result)
    }

    /// Called once per win, so a team crosses the threshold exactly once.
    fn check_qualified(&mut self, team_id: &str) {
        let Some(record) = self.records.get(team_id) else { return };
        if record.wins == self.config.win_threshold {
            info!("{} qualified at {}", team_id, record.record_str());
            self.qualified.push(team_id.to_string());
        }
    }

    /// Called once per loss, so a team crosses the threshold exactly once.
    fn check_eliminated(&mut self, team_id: &str) {
        let Some(record) = self.records.get(team_id) else { return };
        if record.losses == self.config.loss_threshold {
            info!("{} eliminated at {}", team_id, record.record_str());
            self.eliminated.push(team_id.to_string());
        }
    }

    fn refresh_buchholz(&mut self) {
        let wins: HashMap<String, u32> = self
            .records
            .iter()
            .map(|(id, r)| (id.clone(), r.wins))
            .collect();
        for record in self.records.values_mut() {
            record.buchholz = record
                .opponents
                .iter()
                .map(|o| wins.get(o).copied().unwrap_or(0))
                .sum();
        }
    }

    fn update_complete(&mut self) {
        if !self.is_complete && self.team_ids.iter().all(|t| !self.is_active(t)) {
            info!(
                "Swiss bracket complete: {} qualified, {} eliminated",
                self.qualified.len(),
                self.eliminated.len()
            );
            self.is_complete = true;
        }
    }

    /// Every record in standings order. Ties keep entry order.
    pub fn get_standings(&self) -> Vec<&SwissRecord> {
        let mut standings: Vec<&SwissRecord> = self.team_ids.iter().map(|t| &self.records[t]).collect();
        standings.sort_by_key(|r| r.sort_key());
        standings
    }

    /// Standings rows with qualification flags.
    pub fn standings_snapshot(&self) -> Vec<StandingsEntry> {
        self.get_standings()
            .into_iter()
            .map(|r| StandingsEntry {
                team_id: r.team_id.clone(),
                wins: r.wins,
                losses: r.losses,
                game_wins: r.game_wins,
                game_losses: r.game_losses,
                game_diff: r.game_diff(),
                buchholz: r.buchholz,
                qualified: self.is_qualified(r),
                eliminated: self.is_eliminated(r),
            })
            .collect()
    }

    /// Qualified teams in standings order, used as next-stage seeds.
    pub fn get_qualified_seeded(&self) -> Vec<String> {
        let mut records: Vec<&SwissRecord> = self.qualified.iter().map(|t| &self.records[t]).collect();
        records.sort_by_key(|r| r.sort_key());
        records.into_iter().map(|r| r.team_id.clone()).collect()
    }

    /// The best `n` teams for seeding: qualified teams first in seeded order,
    /// then the rest of the standings.
    pub fn top_seeds(&self, n: usize) -> Vec<String> {
        let mut seeds = self.get_qualified_seeded();
        for record in self.get_standings() {
            if !seeds.contains(&record.team_id) {
                seeds.push(record.team_id.clone());
            }
        }
        seeds.truncate(n);
        seeds
    }
}
