//! Tunable parameters for the match engine and tournament formats.
//!
//! Every config has a `Default` matching the regional ruleset and can be
//! loaded from JSON, with missing fields falling back to the defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ASSIST_PROBABILITY, BASELINE_SAVE_CONVERSION, BASE_CONVERSION_RATE, BASE_SCORING_CHANCES,
    CHANCE_NOISE_STDDEV, MIN_CHANCES, OVERTIME_CHANCE_DIVISOR,
};

/// Match engine parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Average chances per side per regulation game
    pub base_chances: f64,

    /// Conversion probability for evenly matched attacker and defense
    pub base_conversion: f64,

    /// Floor on regulation chances
    pub min_chances: u32,

    /// Standard deviation of the chance-count noise
    pub chance_noise_stddev: f64,

    /// Overtime chances are regulation chances divided by this
    pub overtime_divisor: u32,

    /// Probability that a goal carries an assist
    pub assist_probability: f64,

    /// Conversion rate assumed when back-computing shots against
    pub save_conversion: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            base_chances: BASE_SCORING_CHANCES,
            base_conversion: BASE_CONVERSION_RATE,
            min_chances: MIN_CHANCES,
            chance_noise_stddev: CHANCE_NOISE_STDDEV,
            overtime_divisor: OVERTIME_CHANCE_DIVISOR,
            assist_probability: ASSIST_PROBABILITY,
            save_conversion: BASELINE_SAVE_CONVERSION,
        }
    }
}

/// Swiss stage thresholds and series length
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwissConfig {
    pub win_threshold: u32,
    pub loss_threshold: u32,
    pub best_of: u32,
}

impl Default for SwissConfig {
    fn default() -> Self {
        SwissConfig {
            win_threshold: 3,
            loss_threshold: 3,
            best_of: 5,
        }
    }
}

/// Full regional ruleset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalConfig {
    /// Each of the two opening groups
    pub group: SwissConfig,

    /// The 16-team Swiss playoff
    pub playoff: SwissConfig,

    /// Series length in the double-elimination bracket
    pub double_elim_best_of: u32,
}

impl Default for RegionalConfig {
    fn default() -> Self {
        RegionalConfig {
            group: SwissConfig::default(),
            playoff: SwissConfig::default(),
            double_elim_best_of: 7,
        }
    }
}

impl RegionalConfig {
    /// Parse a ruleset from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl MatchConfig {
    /// Parse engine parameters from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
