use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RosterError, RosterResult};

/// Lowest legal attribute value
pub const MIN_ATTRIBUTE: u8 = 1;

/// Highest legal attribute value
pub const MAX_ATTRIBUTE: u8 = 99;

/// The twenty skill attributes of a player, each on a 1-99 scale.
///
/// Deserializes from a name → value map through [`PlayerAttributes::from_pairs`],
/// so missing attributes default to 50 and bad names or values are rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>")]
pub struct PlayerAttributes {
    // Mechanics
    pub aerial: u8,
    pub ground_control: u8,
    pub shooting: u8,
    pub advanced_mechanics: u8,
    pub recovery: u8,
    pub car_control: u8,

    // Game sense
    pub positioning: u8,
    pub game_reading: u8,
    pub decision_making: u8,
    pub passing: u8,
    pub boost_management: u8,

    // Defense/offense
    pub saving: u8,
    pub challenging: u8,
    pub finishing: u8,
    pub creativity: u8,

    // Meta
    pub speed: u8,
    /// Performance reliability. Lower values widen per-chance variance.
    pub consistency: u8,
    /// Performance in elimination games and overtime
    pub clutch: u8,
    pub mental: u8,
    /// Scales the whole lineup's offense
    pub teamwork: u8,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self::uniform(50)
    }
}

impl PlayerAttributes {
    /// Every attribute set to the same value.
    pub fn uniform(value: u8) -> Self {
        PlayerAttributes {
            aerial: value,
            ground_control: value,
            shooting: value,
            advanced_mechanics: value,
            recovery: value,
            car_control: value,
            positioning: value,
            game_reading: value,
            decision_making: value,
            passing: value,
            boost_management: value,
            saving: value,
            challenging: value,
            finishing: value,
            creativity: value,
            speed: value,
            consistency: value,
            clutch: value,
            mental: value,
            teamwork: value,
        }
    }

    /// Build from `(name, value)` pairs on top of the defaults.
    pub fn from_pairs<'a, I>(pairs: I) -> RosterResult<Self>
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let mut attrs = PlayerAttributes::default();
        for (name, value) in pairs {
            attrs.set(name, value)?;
        }
        Ok(attrs)
    }

    /// Set a single attribute by name, validating the 1-99 range.
    pub fn set(&mut self, name: &str, value: i64) -> RosterResult<()> {
        if value < MIN_ATTRIBUTE as i64 || value > MAX_ATTRIBUTE as i64 {
            return Err(RosterError::AttributeOutOfRange {
                name: name.to_string(),
                value,
            });
        }
        let slot = match name {
            "aerial" => &mut self.aerial,
            "ground_control" => &mut self.ground_control,
            "shooting" => &mut self.shooting,
            "advanced_mechanics" => &mut self.advanced_mechanics,
            "recovery" => &mut self.recovery,
            "car_control" => &mut self.car_control,
            "positioning" => &mut self.positioning,
            "game_reading" => &mut self.game_reading,
            "decision_making" => &mut self.decision_making,
            "passing" => &mut self.passing,
            "boost_management" => &mut self.boost_management,
            "saving" => &mut self.saving,
            "challenging" => &mut self.challenging,
            "finishing" => &mut self.finishing,
            "creativity" => &mut self.creativity,
            "speed" => &mut self.speed,
            "consistency" => &mut self.consistency,
            "clutch" => &mut self.clutch,
            "mental" => &mut self.mental,
            "teamwork" => &mut self.teamwork,
            other => return Err(RosterError::UnknownAttribute(other.to_string())),
        };
        *slot = value as u8;
        Ok(())
    }

    /// Weighted overall rating, game sense counted heaviest.
    pub fn overall(&self) -> u32 {
        let mechanical = avg(&[
            self.aerial,
            self.ground_control,
            self.shooting,
            self.advanced_mechanics,
            self.recovery,
            self.car_control,
        ]);
        let game_sense = avg(&[
            self.positioning,
            self.game_reading,
            self.decision_making,
            self.passing,
            self.boost_management,
        ]);
        let defensive = avg(&[self.saving, self.challenging]);
        let offensive = avg(&[self.finishing, self.creativity]);
        let meta = avg(&[self.speed, self.consistency, self.clutch, self.mental, self.teamwork]);

        (mechanical * 0.25 + game_sense * 0.30 + defensive * 0.10 + offensive * 0.15 + meta * 0.20)
            as u32
    }

    /// Per-player contribution to the team offensive rating.
    pub fn offensive_rating(&self) -> u32 {
        (f(self.shooting) * 0.25
            + f(self.finishing) * 0.30
            + f(self.creativity) * 0.20
            + f(self.aerial) * 0.15
            + f(self.ground_control) * 0.10) as u32
    }

    /// Per-player contribution to the team defensive rating.
    pub fn defensive_rating(&self) -> u32 {
        (f(self.saving) * 0.35
            + f(self.challenging) * 0.25
            + f(self.positioning) * 0.25
            + f(self.game_reading) * 0.15) as u32
    }

    /// Likelihood of being the player who takes a given shot.
    pub fn attack_weight(&self) -> f64 {
        f(self.finishing) * 0.4 + f(self.shooting) * 0.3 + f(self.creativity) * 0.3
    }

    /// Quality of a shot taken by this player.
    pub fn shot_quality(&self) -> f64 {
        f(self.finishing) * 0.4 + f(self.shooting) * 0.3 + f(self.creativity) * 0.2 + f(self.aerial) * 0.1
    }

    /// Ability to deny a shot.
    pub fn stopping_power(&self) -> f64 {
        f(self.saving) * 0.5 + f(self.challenging) * 0.3 + f(self.positioning) * 0.2
    }

    /// Likelihood of being credited with an assist.
    pub fn assist_weight(&self) -> f64 {
        f(self.passing) * 0.5 + f(self.creativity) * 0.3 + f(self.game_reading) * 0.2
    }
}

impl TryFrom<BTreeMap<String, i64>> for PlayerAttributes {
    type Error = RosterError;

    fn try_from(values: BTreeMap<String, i64>) -> RosterResult<Self> {
        PlayerAttributes::from_pairs(values.iter().map(|(name, &value)| (name.as_str(), value)))
    }
}

fn f(value: u8) -> f64 {
    value as f64
}

fn avg(values: &[u8]) -> f64 {
    values.iter().map(|&v| f(v)).sum::<f64>() / values.len() as f64
}

/// A player as seen by the match engine: an id and an attribute bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub attributes: PlayerAttributes,
}

impl Player {
    pub fn new(id: impl Into<String>, attributes: PlayerAttributes) -> Self {
        Player {
            id: id.into(),
            attributes,
        }
    }

    pub fn overall(&self) -> u32 {
        self.attributes.overall()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fifty() {
        let attrs = PlayerAttributes::default();
        assert_eq!(attrs.overall(), 50);
        assert_eq!(attrs.offensive_rating(), 50);
        assert_eq!(attrs.defensive_rating(), 50);
    }

    #[test]
    fn test_offensive_rating_truncates() {
        let mut attrs = PlayerAttributes::default();
        attrs.finishing = 99;
        // 50*0.25 + 99*0.30 + 50*0.20 + 50*0.15 + 50*0.10 = 64.7
        assert_eq!(attrs.offensive_rating(), 64);
    }

    #[test]
    fn test_set_by_name() {
        let mut attrs = PlayerAttributes::default();
        attrs.set("clutch", 80).unwrap();
        assert_eq!(attrs.clutch, 80);
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut attrs = PlayerAttributes::default();
        assert_eq!(
            attrs.set("saving", 0),
            Err(RosterError::AttributeOutOfRange {
                name: "saving".to_string(),
                value: 0
            })
        );
        assert!(attrs.set("saving", 100).is_err());
        assert_eq!(attrs.saving, 50);
    }

    #[test]
    fn test_set_rejects_unknown_name() {
        let mut attrs = PlayerAttributes::default();
        assert_eq!(
            attrs.set("boost", 60),
            Err(RosterError::UnknownAttribute("boost".to_string()))
        );
    }

    #[test]
    fn test_from_pairs() {
        let attrs = PlayerAttributes::from_pairs([("finishing", 90), ("teamwork", 30)]).unwrap();
        assert_eq!(attrs.finishing, 90);
        assert_eq!(attrs.teamwork, 30);
        assert_eq!(attrs.saving, 50);
    }

    #[test]
    fn test_deserialize_validates() {
        let attrs: PlayerAttributes = serde_json::from_str(r#"{"finishing": 90}"#).unwrap();
        assert_eq!(attrs.finishing, 90);
        assert_eq!(attrs.saving, 50);

        assert!(serde_json::from_str::<PlayerAttributes>(r#"{"saving": 150}"#).is_err());
        assert!(serde_json::from_str::<PlayerAttributes>(r#"{"saving": 0}"#).is_err());
        assert!(serde_json::from_str::<PlayerAttributes>(r#"{"boost": 60}"#).is_err());
    }

    #[test]
    fn test_serialized_attributes_load_back() {
        let mut attrs = PlayerAttributes::uniform(70);
        attrs.clutch = 95;
        let json = serde_json::to_string(&attrs).unwrap();
        let loaded: PlayerAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, attrs);
    }
}
