/// Average scoring chances per team per regulation game
pub const BASE_SCORING_CHANCES: f64 = 12.0;

/// Base probability of converting a single chance
pub const BASE_CONVERSION_RATE: f64 = 0.25;

/// Minimum chances a side gets in regulation
pub const MIN_CHANCES: u32 = 5;

/// Standard deviation of the per-game chance noise
pub const CHANCE_NOISE_STDDEV: f64 = 2.0;

/// Overtime chance counts are regulation counts divided by this
pub const OVERTIME_CHANCE_DIVISOR: u32 = 3;

/// Probability that a goal is credited with an assist
pub const ASSIST_PROBABILITY: f64 = 0.6;

/// Shot conversion assumed when estimating shots against for saves
pub const BASELINE_SAVE_CONVERSION: f64 = 0.3;

/// Conversion probability bounds
pub const MIN_CONVERSION: f64 = 0.05;
pub const MAX_CONVERSION: f64 = 0.60;

/// Chance modifier bounds
pub const MIN_CHANCE_MODIFIER: f64 = 0.8;
pub const MAX_CHANCE_MODIFIER: f64 = 1.6;

/// Consistency multiplier bounds
pub const MIN_CONSISTENCY_FACTOR: f64 = 0.5;
pub const MAX_CONSISTENCY_FACTOR: f64 = 1.5;

/// Rating used when a side fields nobody
pub const EMPTY_LINEUP_RATING: f64 = 50.0;

/// Players fielded per game
pub const ACTIVE_ROSTER_SIZE: usize = 3;

/// Largest roster a team may carry
pub const MAX_ROSTER_SIZE: usize = 5;

/// Games credited to a team receiving a Swiss bye
pub const BYE_GAME_WINS: u32 = 3;

/// Entrants in a regional
pub const REGIONAL_TEAM_COUNT: usize = 32;

/// Teams in a double-elimination bracket
pub const DOUBLE_ELIM_TEAM_COUNT: usize = 8;

/// Regional points by placement (index 0 = 1st place)
pub const REGIONAL_POINTS: [u32; 16] = [15, 11, 9, 7, 5, 5, 4, 4, 3, 3, 3, 2, 2, 2, 1, 1];

/// Points earned for a regional placement. Anything outside 1..=16 earns nothing.
pub fn regional_points(place: u32) -> u32 {
    match place {
        1..=16 => REGIONAL_POINTS[(place - 1) as usize],
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_table_bands() {
        assert_eq!(regional_points(1), 15);
        assert_eq!(regional_points(2), 11);
        assert_eq!(regional_points(3), 9);
        assert_eq!(regional_points(4), 7);
        assert_eq!(regional_points(5), regional_points(6));
        assert_eq!(regional_points(7), 4);
        assert_eq!(regional_points(11), 3);
        assert_eq!(regional_points(12), 2);
        assert_eq!(regional_points(16), 1);
        assert_eq!(regional_points(17), 0);
        assert_eq!(regional_points(32), 0);
        assert_eq!(regional_points(0), 0);
    }
}
