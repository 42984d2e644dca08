use serde::{Deserialize, Serialize};

use crate::constants::{ACTIVE_ROSTER_SIZE, MAX_ROSTER_SIZE};
use crate::error::{RosterError, RosterResult};
use crate::player::Player;

/// Neutral chemistry value
pub const DEFAULT_CHEMISTRY: u8 = 50;

/// Team as supplied by the roster manager.
///
/// The first three players of `roster` are the active lineup; anyone after
/// that is a substitute and never takes the field. Deserialization goes
/// through [`Team::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TeamRecord")]
pub struct Team {
    pub id: String,

    /// Ordered roster, at most five players
    pub roster: Vec<Player>,

    /// Roster cohesion on a 0-100 scale
    pub chemistry: u8,
}

/// Unvalidated wire form of a [`Team`]
#[derive(Deserialize)]
struct TeamRecord {
    id: String,
    roster: Vec<Player>,
    #[serde(default = "default_chemistry")]
    chemistry: u8,
}

fn default_chemistry() -> u8 {
    DEFAULT_CHEMISTRY
}

impl TryFrom<TeamRecord> for Team {
    type Error = RosterError;

    fn try_from(record: TeamRecord) -> RosterResult<Self> {
        Team::new(record.id, record.roster, record.chemistry)
    }
}

impl Team {
    /// Create a new Team.
    ///
    /// Chemistry above 100 is clamped.
    pub fn new(id: impl Into<String>, roster: Vec<Player>, chemistry: u8) -> RosterResult<Self> {
        let id = id.into();
        if roster.is_empty() {
            return Err(RosterError::EmptyRoster(id));
        }
        if roster.len() > MAX_ROSTER_SIZE {
            return Err(RosterError::TooManyPlayers {
                team: id,
                found: roster.len(),
            });
        }
        Ok(Team {
            id,
            roster,
            chemistry: chemistry.min(100),
        })
    }

    /// Players fielded in a game
    pub fn active_roster(&self) -> &[Player] {
        let n = self.roster.len().min(ACTIVE_ROSTER_SIZE);
        &self.roster[..n]
    }

    /// First bench player, if any
    pub fn substitute(&self) -> Option<&Player> {
        self.roster.get(ACTIVE_ROSTER_SIZE)
    }

    /// Average overall of the active lineup plus a chemistry bonus of up to five points.
    pub fn team_overall(&self) -> f64 {
        let active = self.active_roster();
        let base = active.iter().map(|p| p.overall() as f64).sum::<f64>() / active.len() as f64;
        base + (self.chemistry as f64 - 50.0) * 0.1
    }

    /// Copy of this team with different chemistry
    pub fn with_chemistry(&self, chemistry: u8) -> Self {
        Team {
            id: self.id.clone(),
            roster: self.roster.clone(),
            chemistry: chemistry.min(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerAttributes;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(format!("p{}", i), PlayerAttributes::default()))
            .collect()
    }

    #[test]
    fn test_active_roster_is_first_three() {
        let team = Team::new("T", players(5), 50).unwrap();
        let ids: Vec<&str> = team.active_roster().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2"]);
        assert_eq!(team.substitute().map(|p| p.id.as_str()), Some("p3"));
    }

    #[test]
    fn test_short_roster() {
        let team = Team::new("T", players(2), 50).unwrap();
        assert_eq!(team.active_roster().len(), 2);
        assert!(team.substitute().is_none());
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert_eq!(
            Team::new("T", vec![], 50),
            Err(RosterError::EmptyRoster("T".to_string()))
        );
        assert!(matches!(
            Team::new("T", players(6), 50),
            Err(RosterError::TooManyPlayers { found: 6, .. })
        ));
    }

    #[test]
    fn test_team_overall_chemistry() {
        let team = Team::new("T", players(3), 70).unwrap();
        assert!((team.team_overall() - 52.0).abs() < 1e-10);
        assert_eq!(team.with_chemistry(200).chemistry, 100);
    }

    #[test]
    fn test_deserialize_validates_roster() {
        let err = serde_json::from_str::<Team>(r#"{"id":"X","roster":[],"chemistry":50}"#).unwrap_err();
        assert!(err.to_string().contains("empty roster"));

        let roster: Vec<String> = (0..6)
            .map(|i| format!(r#"{{"id":"p{}","attributes":{{}}}}"#, i))
            .collect();
        let json = format!(r#"{{"id":"X","roster":[{}]}}"#, roster.join(","));
        assert!(serde_json::from_str::<Team>(&json).is_err());
    }

    #[test]
    fn test_deserialize_defaults_chemistry() {
        let team: Team =
            serde_json::from_str(r#"{"id":"X","roster":[{"id":"p0","attributes":{"saving":80}}]}"#).unwrap();
        assert_eq!(team.chemistry, DEFAULT_CHEMISTRY);
        assert_eq!(team.roster[0].attributes.saving, 80);

        let round_trip: Team = serde_json::from_str(&serde_json::to_string(&team).unwrap()).unwrap();
        assert_eq!(round_trip, team);
    }
}
