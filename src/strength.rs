use serde::{Deserialize, Serialize};

use crate::constants::EMPTY_LINEUP_RATING;
use crate::player::Player;
use crate::team::Team;

/// Offensive and defensive ratings of a fielded lineup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    pub offense: f64,
    pub defense: f64,
}

impl TeamStrength {
    /// Ratings for a team's active roster.
    pub fn of(team: &Team) -> Self {
        Self::from_lineup(team.active_roster(), team.chemistry)
    }

    pub fn from_lineup(players: &[Player], chemistry: u8) -> Self {
        TeamStrength {
            offense: offensive_rating(players, chemistry),
            defense: defensive_rating(players, chemistry),
        }
    }
}

/// Multiplier of +/-0.3% per chemistry point away from 50.
fn chemistry_modifier(chemistry: u8) -> f64 {
    1.0 + (chemistry as f64 - 50.0) * 0.003
}

/// Calculate a lineup's offensive strength.
///
/// Averages each player's offensive rating, then scales by chemistry and by
/// the lineup's average teamwork (+/-0.2% per point away from 50).
pub fn offensive_rating(players: &[Player], chemistry: u8) -> f64 {
    if players.is_empty() {
        return EMPTY_LINEUP_RATING;
    }

    let n = players.len() as f64;
    let base = players
        .iter()
        .map(|p| p.attributes.offensive_rating() as f64)
        .sum::<f64>()
        / n;

    let teamwork = players.iter().map(|p| p.attributes.teamwork as f64).sum::<f64>() / n;
    let teamwork_mod = 1.0 + (teamwork - 50.0) * 0.002;

    base * chemistry_modifier(chemistry) * teamwork_mod
}

/// Calculate a lineup's defensive strength.
pub fn defensive_rating(players: &[Player], chemistry: u8) -> f64 {
    if players.is_empty() {
        return EMPTY_LINEUP_RATING;
    }

    let base = players
        .iter()
        .map(|p| p.attributes.defensive_rating() as f64)
        .sum::<f64>()
        / players.len() as f64;

    base * chemistry_modifier(chemistry)
}
