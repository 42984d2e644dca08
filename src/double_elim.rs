//! Eight-team double-elimination bracket.
//!
//! The bracket is a fixed table of fifteen match slots. Each slot knows where
//! its winner and loser go; recording a result fills the downstream slots.
//! What can be played next is always derived from which slots are decided.

use std::collections::BTreeMap;
use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::constants::DOUBLE_ELIM_TEAM_COUNT;
use crate::error::{BracketError, BracketResult};

/// Stable identifier of a bracket slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchId {
    UbR1_1,
    UbR1_2,
    UbR1_3,
    UbR1_4,
    UbSf1,
    UbSf2,
    UbF,
    LbR1_1,
    LbR1_2,
    LbR2_1,
    LbR2_2,
    LbSf,
    LbF,
    Gf,
    Br,
}

impl MatchId {
    pub const ALL: [MatchId; 15] = [
        MatchId::UbR1_1,
        MatchId::UbR1_2,
        MatchId::UbR1_3,
        MatchId::UbR1_4,
        MatchId::UbSf1,
        MatchId::UbSf2,
        MatchId::UbF,
        MatchId::LbR1_1,
        MatchId::LbR1_2,
        MatchId::LbR2_1,
        MatchId::LbR2_2,
        MatchId::LbSf,
        MatchId::LbF,
        MatchId::Gf,
        MatchId::Br,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchId::UbR1_1 => "UB_R1_1",
            MatchId::UbR1_2 => "UB_R1_2",
            MatchId::UbR1_3 => "UB_R1_3",
            MatchId::UbR1_4 => "UB_R1_4",
            MatchId::UbSf1 => "UB_SF_1",
            MatchId::UbSf2 => "UB_SF_2",
            MatchId::UbF => "UB_F",
            MatchId::LbR1_1 => "LB_R1_1",
            MatchId::LbR1_2 => "LB_R1_2",
            MatchId::LbR2_1 => "LB_R2_1",
            MatchId::LbR2_2 => "LB_R2_2",
            MatchId::LbSf => "LB_SF",
            MatchId::LbF => "LB_F",
            MatchId::Gf => "GF",
            MatchId::Br => "BR",
        }
    }

    pub fn parse(s: &str) -> Option<MatchId> {
        MatchId::ALL.iter().copied().find(|id| id.as_str() == s)
    }

    /// Phase this slot is played in
    pub fn phase(self) -> Phase {
        match self {
            MatchId::UbR1_1 | MatchId::UbR1_2 | MatchId::UbR1_3 | MatchId::UbR1_4 => Phase::UpperRound1,
            MatchId::UbSf1 | MatchId::UbSf2 | MatchId::LbR1_1 | MatchId::LbR1_2 => {
                Phase::UpperSemisLowerRound1
            }
            MatchId::UbF | MatchId::LbR2_1 | MatchId::LbR2_2 => Phase::UpperFinalLowerRound2,
            MatchId::LbSf => Phase::LowerSemifinal,
            MatchId::LbF => Phase::LowerFinal,
            MatchId::Gf => Phase::GrandFinal,
            MatchId::Br => Phase::BracketReset,
        }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of the bracket, in play order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    UpperRound1,
    UpperSemisLowerRound1,
    UpperFinalLowerRound2,
    LowerSemifinal,
    LowerFinal,
    GrandFinal,
    BracketReset,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Seat {
    First,
    Second,
}

/// Where a team goes after a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Route {
    Advance(MatchId, Seat),
    Place(u32),
}

/// Winner and loser routes of every slot except the grand final and reset,
/// whose outcomes depend on who won.
fn wiring(id: MatchId) -> Option<(Route, Route)> {
    use MatchId::*;
    use Route::*;
    use Seat::*;

    let routes = match id {
        UbR1_1 => (Advance(UbSf1, First), Advance(LbR1_1, First)),
        UbR1_2 => (Advance(UbSf1, Second), Advance(LbR1_1, Second)),
        UbR1_3 => (Advance(UbSf2, First), Advance(LbR1_2, First)),
        UbR1_4 => (Advance(UbSf2, Second), Advance(LbR1_2, Second)),
        UbSf1 => (Advance(UbF, First), Advance(LbR2_2, Second)),
        UbSf2 => (Advance(UbF, Second), Advance(LbR2_1, Second)),
        UbF => (Advance(Gf, First), Advance(LbF, Second)),
        LbR1_1 => (Advance(LbR2_1, First), Place(7)),
        LbR1_2 => (Advance(LbR2_2, First), Place(7)),
        LbR2_1 => (Advance(LbSf, First), Place(5)),
        LbR2_2 => (Advance(LbSf, Second), Place(5)),
        LbSf => (Advance(LbF, First), Place(4)),
        LbF => (Advance(Gf, Second), Place(3)),
        Gf | Br => return None,
    };
    Some(routes)
}

/// Decided outcome of a slot. Game counts are oriented to the slot's seats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub winner: String,
    pub loser: String,
    pub team1_games: u32,
    pub team2_games: u32,
}

/// One match in the bracket. Seats stay `None` until an upstream match decides them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSlot {
    pub id: MatchId,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub decision: Option<Decision>,
}

impl MatchSlot {
    fn empty(id: MatchId) -> Self {
        MatchSlot {
            id,
            team1: None,
            team2: None,
            decision: None,
        }
    }

    /// Both seats known and no result yet
    pub fn is_playable(&self) -> bool {
        self.team1.is_some() && self.team2.is_some() && self.decision.is_none()
    }

    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }

    pub fn winner(&self) -> Option<&str> {
        self.decision.as_ref().map(|d| d.winner.as_str())
    }

    fn seat_mut(&mut self, seat: Seat) -> &mut Option<String> {
        match seat {
            Seat::First => &mut self.team1,
            Seat::Second => &mut self.team2,
        }
    }
}

/// A playable match handed to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMatch {
    pub match_id: MatchId,
    pub team1: String,
    pub team2: String,
}

/// Log entry for a recorded match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketResultEntry {
    pub match_id: MatchId,
    pub team1_id: String,
    pub team2_id: String,
    pub winner_id: String,
    pub loser_id: String,
    pub team1_games: u32,
    pub team2_games: u32,
}

/// Double-elimination bracket for eight seeded teams.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DoubleEliminationBracket {
    team_ids: Vec<String>,
    best_of: u32,
    slots: Vec<MatchSlot>,
    placements: BTreeMap<u32, Vec<String>>,
    results: Vec<BracketResultEntry>,
}

impl DoubleEliminationBracket {
    /// Build the bracket from teams in seed order (first = seed 1).
    ///
    /// Upper round 1 pairs seeds 1v8, 4v5, 2v7 and 3v6.
    pub fn new(team_ids: Vec<String>, best_of: u32) -> BracketResult<Self> {
        if team_ids.len() != DOUBLE_ELIM_TEAM_COUNT {
            return Err(BracketError::InvalidTeamCount {
                expected: DOUBLE_ELIM_TEAM_COUNT,
                found: team_ids.len(),
            });
        }

        let mut slots: Vec<MatchSlot> = MatchId::ALL.iter().map(|&id| MatchSlot::empty(id)).collect();
        let openers = [
            (MatchId::UbR1_1, 0, 7),
            (MatchId::UbR1_2, 3, 4),
            (MatchId::UbR1_3, 1, 6),
            (MatchId::UbR1_4, 2, 5),
        ];
        for (id, high, low) in openers {
            let slot = &mut slots[id.index()];
            slot.team1 = Some(team_ids[high].clone());
            slot.team2 = Some(team_ids[low].clone());
        }

        Ok(DoubleEliminationBracket {
            team_ids,
            best_of,
            slots,
            placements: BTreeMap::new(),
            results: Vec::new(),
        })
    }

    pub fn team_ids(&self) -> &[String] {
        &self.team_ids
    }

    pub fn best_of(&self) -> u32 {
        self.best_of
    }

    pub fn slot(&self, id: MatchId) -> &MatchSlot {
        &self.slots[id.index()]
    }

    pub fn slots(&self) -> &[MatchSlot] {
        &self.slots
    }

    pub fn results(&self) -> &[BracketResultEntry] {
        &self.results
    }

    /// Current phase, derived from which slots are decided.
    pub fn current_phase(&self) -> Phase {
        let decided = |id: MatchId| self.slot(id).is_decided();
        let all = |ids: &[MatchId]| ids.iter().all(|&id| decided(id));

        if !all(&[MatchId::UbR1_1, MatchId::UbR1_2, MatchId::UbR1_3, MatchId::UbR1_4]) {
            Phase::UpperRound1
        } else if !all(&[MatchId::UbSf1, MatchId::UbSf2, MatchId::LbR1_1, MatchId::LbR1_2]) {
            Phase::UpperSemisLowerRound1
        } else if !all(&[MatchId::UbF, MatchId::LbR2_1, MatchId::LbR2_2]) {
            Phase::UpperFinalLowerRound2
        } else if !decided(MatchId::LbSf) {
            Phase::LowerSemifinal
        } else if !decided(MatchId::LbF) {
            Phase::LowerFinal
        } else if !decided(MatchId::Gf) {
            Phase::GrandFinal
        } else if self.reset_needed() && !decided(MatchId::Br) {
            Phase::BracketReset
        } else {
            Phase::Complete
        }
    }

    /// The lower-bracket finalist took the first grand final.
    pub fn reset_needed(&self) -> bool {
        let gf = self.slot(MatchId::Gf);
        match (&gf.decision, &gf.team1) {
            (Some(decision), Some(upper)) => &decision.winner != upper,
            _ => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_phase() == Phase::Complete
    }

    /// Matches that can be played now: filled, undecided slots of the current phase.
    pub fn get_next_matches(&self) -> Vec<PendingMatch> {
        let phase = self.current_phase();
        self.slots
            .iter()
            .filter(|slot| slot.id.phase() == phase && slot.is_playable())
            .filter_map(|slot| match (&slot.team1, &slot.team2) {
                (Some(team1), Some(team2)) => Some(PendingMatch {
                    match_id: slot.id,
                    team1: team1.clone(),
                    team2: team2.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Record a result by slot name, e.g. `"UB_R1_1"`.
    ///
    /// `team1_games`/`team2_games` are the winner's and loser's game counts
    /// when the winner sits in seat one; they are reoriented to the slot's
    /// seats otherwise.
    pub fn record_result(
        &mut self,
        match_id: &str,
        winner_id: &str,
        team1_games: u32,
        team2_games: u32,
    ) -> BracketResult<BracketResultEntry> {
        let id = MatchId::parse(match_id).ok_or_else(|| BracketError::MatchNotFound(match_id.to_string()))?;
        self.record(id, winner_id, team1_games, team2_games)
    }

    /// Record a result for a slot.
    pub fn record(
        &mut self,
        id: MatchId,
        winner_id: &str,
        team1_games: u32,
        team2_games: u32,
    ) -> BracketResult<BracketResultEntry> {
        let slot = &self.slots[id.index()];
        if !slot.is_playable() {
            return Err(BracketError::MatchNotReady(id.to_string()));
        }
        let (team1, team2) = match (&slot.team1, &slot.team2) {
            (Some(t1), Some(t2)) => (t1.clone(), t2.clone()),
            _ => return Err(BracketError::MatchNotReady(id.to_string())),
        };

        let loser_id = if winner_id == team1 {
            team2.clone()
        } else if winner_id == team2 {
            team1.clone()
        } else {
            return Err(BracketError::InvalidWinner {
                match_id: id.to_string(),
                team: winner_id.to_string(),
            });
        };

        let (seat1_games, seat2_games) = if winner_id == team1 {
            (team1_games, team2_games)
        } else {
            (team2_games, team1_games)
        };

        let decision = Decision {
            winner: winner_id.to_string(),
            loser: loser_id.clone(),
            team1_games: seat1_games,
            team2_games: seat2_games,
        };
        self.slots[id.index()].decision = Some(decision);

        let entry = BracketResultEntry {
            match_id: id,
            team1_id: team1.clone(),
            team2_id: team2,
            winner_id: winner_id.to_string(),
            loser_id: loser_id.clone(),
            team1_games: seat1_games,
            team2_games: seat2_games,
        };
        self.results.push(entry.clone());

        self.advance(id, winner_id, &loser_id, &team1);
        Ok(entry)
    }

    fn advance(&mut self, id: MatchId, winner: &str, loser: &str, seat1: &str) {
        match wiring(id) {
            Some((winner_route, loser_route)) => {
                self.route(winner, winner_route);
                self.route(loser, loser_route);
            }
            None if id == MatchId::Gf && winner != seat1 => {
                info!("Bracket reset: {} beat upper finalist {}", winner, loser);
                let reset = &mut self.slots[MatchId::Br.index()];
                reset.team1 = Some(loser.to_string());
                reset.team2 = Some(winner.to_string());
            }
            None => {
                self.set_placement(winner, 1);
                self.set_placement(loser, 2);
            }
        }
    }

    fn route(&mut self, team: &str, route: Route) {
        match route {
            Route::Advance(target, seat) => {
                *self.slots[target.index()].seat_mut(seat) = Some(team.to_string());
            }
            Route::Place(place) => self.set_placement(team, place),
        }
    }

    fn set_placement(&mut self, team: &str, place: u32) {
        if self.placement_of(team).is_some() {
            return;
        }
        info!("{} finishes {}", team, place);
        self.placements.entry(place).or_default().push(team.to_string());
    }

    /// Placement → teams. Bands share a key: both 7th-8th teams sit under 7,
    /// both 5th-6th under 5.
    pub fn placements(&self) -> &BTreeMap<u32, Vec<String>> {
        &self.placements
    }

    pub fn placement_of(&self, team: &str) -> Option<u32> {
        self.placements
            .iter()
            .find(|(_, teams)| teams.iter().any(|t| t == team))
            .map(|(&place, _)| place)
    }
}
