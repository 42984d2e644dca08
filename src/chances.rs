//! Chance generation and resolution.
//!
//! A side's offensive rating against the opposing defensive rating decides how
//! many scoring chances it gets; each chance is then given to one attacker and
//! rolled against the defenders.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use statrs::distribution::Normal;

use crate::config::MatchConfig;
use crate::constants::{
    MAX_CHANCE_MODIFIER, MAX_CONSISTENCY_FACTOR, MAX_CONVERSION, MIN_CHANCE_MODIFIER,
    MIN_CONSISTENCY_FACTOR, MIN_CONVERSION,
};
use crate::game::PlayerMatchStats;
use crate::player::Player;

/// Goals scored by one side and the stat lines of its players.
#[derive(Clone, Debug, PartialEq)]
pub struct ChanceOutcome {
    pub goals: u32,
    pub stats: Vec<PlayerMatchStats>,
}

/// Draw from N(mean, std_dev). A non-positive deviation returns the mean.
pub fn gaussian<R: Rng + ?Sized>(mean: f64, std_dev: f64, rng: &mut R) -> f64 {
    if std_dev <= 0.0 {
        return mean;
    }
    match Normal::new(mean, std_dev) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    }
}

/// Index drawn proportionally to `weights`. Falls back to 0 when no weight is positive.
pub fn weighted_pick<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0,
    }
}

/// Number of scoring chances for one side in one regulation game.
pub fn generate_chances<R: Rng + ?Sized>(
    offense: f64,
    defense: f64,
    config: &MatchConfig,
    rng: &mut R,
) -> u32 {
    let ratio = offense / defense.max(1.0);
    let modifier = (0.8 + ratio * 0.4).clamp(MIN_CHANCE_MODIFIER, MAX_CHANCE_MODIFIER);

    let base = config.base_chances * modifier;
    let noise = gaussian(0.0, config.chance_noise_stddev, rng);

    let chances = (base + noise).round();
    if chances < config.min_chances as f64 {
        config.min_chances
    } else {
        chances as u32
    }
}

/// Reduced chance count for one overtime iteration, never below one.
pub fn generate_overtime_chances<R: Rng + ?Sized>(
    offense: f64,
    defense: f64,
    config: &MatchConfig,
    rng: &mut R,
) -> u32 {
    let divisor = config.overtime_divisor.max(1);
    (generate_chances(offense, defense, config, rng) / divisor).max(1)
}

/// Probability that `attacker` converts a chance against `defenders`.
///
/// In elimination games and overtime the attacker's clutch shifts the
/// probability by 0.5% per point away from 50.
pub fn conversion_probability(
    attacker: &Player,
    defenders: &[Player],
    is_clutch: bool,
    config: &MatchConfig,
) -> f64 {
    let attack_score = attacker.attributes.shot_quality();

    let defend_score = if defenders.is_empty() {
        50.0
    } else {
        defenders
            .iter()
            .map(|d| d.attributes.stopping_power())
            .sum::<f64>()
            / defenders.len() as f64
    };

    let ratio = attack_score / defend_score.max(1.0);
    let mut prob = config.base_conversion * (0.5 + ratio * 0.5);

    if is_clutch {
        prob *= 1.0 + (attacker.attributes.clutch as f64 - 50.0) * 0.005;
    }

    prob.clamp(MIN_CONVERSION, MAX_CONVERSION)
}

/// Per-chance multiplier around 1.0; spread widens as consistency drops.
pub fn consistency_factor<R: Rng + ?Sized>(consistency: u8, rng: &mut R) -> f64 {
    let std_dev = (100.0 - consistency as f64) / 100.0 * 0.4;
    gaussian(1.0, std_dev, rng).clamp(MIN_CONSISTENCY_FACTOR, MAX_CONSISTENCY_FACTOR)
}

/// Turn a chance count into goals, shots and assists for the attacking side.
///
/// Only the first three attackers and defenders take part. The returned stat
/// lines follow the attackers' order.
pub fn resolve_chances<R: Rng + ?Sized>(
    num_chances: u32,
    attackers: &[Player],
    defenders: &[Player],
    is_clutch: bool,
    config: &MatchConfig,
    rng: &mut R,
) -> ChanceOutcome {
    let attackers = &attackers[..attackers.len().min(3)];
    let defenders = &defenders[..defenders.len().min(3)];

    let mut stats: Vec<PlayerMatchStats> =
        attackers.iter().map(|p| PlayerMatchStats::new(&p.id)).collect();
    if attackers.is_empty() {
        return ChanceOutcome { goals: 0, stats };
    }

    let attack_weights: Vec<f64> = attackers.iter().map(|p| p.attributes.attack_weight()).collect();
    let mut goals = 0;

    for _ in 0..num_chances {
        let shooter_idx = weighted_pick(&attack_weights, rng);
        let shooter = &attackers[shooter_idx];

        let prob = conversion_probability(shooter, defenders, is_clutch, config)
            * consistency_factor(shooter.attributes.consistency, rng);

        stats[shooter_idx].shots += 1;

        if rng.gen::<f64>() < prob {
            goals += 1;
            stats[shooter_idx].goals += 1;

            if rng.gen::<f64>() < config.assist_probability && attackers.len() >= 2 {
                let assister_idx = select_assister(attackers, shooter_idx, rng);
                stats[assister_idx].assists += 1;
            }
        }
    }

    ChanceOutcome { goals, stats }
}

/// Pick the teammate credited with an assist, weighted by playmaking.
fn select_assister<R: Rng + ?Sized>(players: &[Player], scorer_idx: usize, rng: &mut R) -> usize {
    let candidates: Vec<usize> = (0..players.len()).filter(|&i| i != scorer_idx).collect();
    let weights: Vec<f64> = candidates
        .iter()
        .map(|&i| players[i].attributes.assist_weight())
        .collect();
    candidates[weighted_pick(&weights, rng)]
}
