//! Single-game simulation: regulation, sudden-death overtime, saves and ratings.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chances::{generate_chances, generate_overtime_chances, resolve_chances, ChanceOutcome};
use crate::config::MatchConfig;
use crate::player::Player;
use crate::strength::TeamStrength;
use crate::team::Team;

/// One player's tally for one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStats {
    pub player_id: String,
    pub goals: u32,
    pub assists: u32,
    pub saves: u32,
    pub shots: u32,
    pub demos: u32,
    /// Match rating on a 1-10 scale
    pub rating: f64,
}

impl PlayerMatchStats {
    pub fn new(player_id: &str) -> Self {
        PlayerMatchStats {
            player_id: player_id.to_string(),
            goals: 0,
            assists: 0,
            saves: 0,
            shots: 0,
            demos: 0,
            rating: 6.0,
        }
    }

    /// Goals per shot, zero without shots
    pub fn shooting_pct(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            self.goals as f64 / self.shots as f64
        }
    }

    fn absorb(&mut self, other: &PlayerMatchStats) {
        self.goals += other.goals;
        self.assists += other.assists;
        self.shots += other.shots;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// Result of a single game. Scores are never level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub home_score: u32,
    pub away_score: u32,
    pub home_stats: Vec<PlayerMatchStats>,
    pub away_stats: Vec<PlayerMatchStats>,
    pub overtime: bool,
}

impl GameResult {
    pub fn winner(&self) -> Side {
        if self.home_score > self.away_score {
            Side::Home
        } else {
            Side::Away
        }
    }

    pub fn total_goals(&self) -> u32 {
        self.home_score + self.away_score
    }
}

/// Where a game sits inside its series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameContext {
    /// 1-based game number
    pub game_number: u32,

    /// Either side is one win from taking the series
    pub is_elimination: bool,
}

/// Simulates individual games with a fixed engine configuration.
#[derive(Clone, Debug, Default)]
pub struct GameSimulator {
    pub config: MatchConfig,
}

impl GameSimulator {
    pub fn new(config: MatchConfig) -> Self {
        GameSimulator { config }
    }

    /// Simulate one game between two teams.
    ///
    /// Regulation gives each side a full chance count. While the score is
    /// level, overtime iterations with reduced chances are played for both
    /// sides until it is not.
    pub fn simulate_game<R: Rng + ?Sized>(
        &self,
        home: &Team,
        away: &Team,
        ctx: GameContext,
        rng: &mut R,
    ) -> GameResult {
        let config = &self.config;
        let home_players = home.active_roster();
        let away_players = away.active_roster();

        let home_strength = TeamStrength::of(home);
        let away_strength = TeamStrength::of(away);

        let home_chances = generate_chances(home_strength.offense, away_strength.defense, config, rng);
        let away_chances = generate_chances(away_strength.offense, home_strength.defense, config, rng);

        let ChanceOutcome {
            goals: mut home_goals,
            stats: mut home_stats,
        } = resolve_chances(home_chances, home_players, away_players, ctx.is_elimination, config, rng);
        let ChanceOutcome {
            goals: mut away_goals,
            stats: mut away_stats,
        } = resolve_chances(away_chances, away_players, home_players, ctx.is_elimination, config, rng);

        let mut overtime = false;
        let mut ot_rounds = 0u32;

        // Neither side can take a chance, so overtime would never end
        if home_goals == away_goals && home_players.is_empty() && away_players.is_empty() {
            warn!("{} vs {}: no players on either side, tie settled by coin flip", home.id, away.id);
            overtime = true;
            if rng.gen_bool(0.5) {
                home_goals += 1;
            } else {
                away_goals += 1;
            }
        }

        while home_goals == away_goals {
            overtime = true;
            ot_rounds += 1;

            let ot_home = generate_overtime_chances(home_strength.offense, away_strength.defense, config, rng);
            let ot_away = generate_overtime_chances(away_strength.offense, home_strength.defense, config, rng);

            let home_ot = resolve_chances(ot_home, home_players, away_players, true, config, rng);
            let away_ot = resolve_chances(ot_away, away_players, home_players, true, config, rng);

            merge_stats(&mut home_stats, &home_ot.stats);
            merge_stats(&mut away_stats, &away_ot.stats);

            home_goals += home_ot.goals;
            away_goals += away_ot.goals;
        }

        if overtime {
            debug!(
                "{} vs {} game {} decided after {} overtime iteration(s)",
                home.id, away.id, ctx.game_number, ot_rounds
            );
        }

        self.distribute_saves(&mut home_stats, away_goals, home_players, rng);
        self.distribute_saves(&mut away_stats, home_goals, away_players, rng);

        calculate_ratings(&mut home_stats, home_goals, away_goals);
        calculate_ratings(&mut away_stats, away_goals, home_goals);

        GameResult {
            home_score: home_goals,
            away_score: away_goals,
            home_stats,
            away_stats,
            overtime,
        }
    }

    /// Spread a side's saves over its fielded players.
    ///
    /// Shots against are estimated from goals conceded at the baseline
    /// conversion rate (8-15 when nothing was conceded). Each player's share
    /// is proportional to their saving attribute, jittered by one either way.
    fn distribute_saves<R: Rng + ?Sized>(
        &self,
        stats: &mut [PlayerMatchStats],
        goals_against: u32,
        players: &[Player],
        rng: &mut R,
    ) {
        let shots_against = if goals_against > 0 {
            (goals_against as f64 / self.config.save_conversion) as u32
        } else {
            rng.gen_range(8..=15)
        };
        let total_saves = shots_against.saturating_sub(goals_against);
        if total_saves == 0 || players.is_empty() {
            return;
        }

        let total_weight: f64 = players.iter().map(|p| p.attributes.saving as f64).sum();
        if total_weight <= 0.0 {
            return;
        }

        for (stat, player) in stats.iter_mut().zip(players) {
            let share = (total_saves as f64 * (player.attributes.saving as f64 / total_weight)) as i64;
            let jittered = share + rng.gen_range(-1..=1);
            stat.saves = jittered.max(0) as u32;
        }
    }
}

fn merge_stats(into: &mut [PlayerMatchStats], from: &[PlayerMatchStats]) {
    for (total, extra) in into.iter_mut().zip(from) {
        total.absorb(extra);
    }
}

/// Rate each player's game on a 1-10 scale.
pub fn calculate_ratings(stats: &mut [PlayerMatchStats], team_goals: u32, opponent_goals: u32) {
    let won = team_goals > opponent_goals;

    for stat in stats.iter_mut() {
        let mut rating = 6.0;
        rating += stat.goals as f64 * 0.8;
        rating += stat.assists as f64 * 0.4;
        rating += stat.saves as f64 * 0.2;

        if stat.shots > 0 {
            let pct = stat.shooting_pct();
            if pct > 0.4 {
                rating += 0.5;
            } else if pct < 0.15 {
                rating -= 0.3;
            }
        }

        rating += if won { 0.5 } else { -0.3 };
        stat.rating = rating.clamp(1.0, 10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerAttributes;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn make_team(id: &str, level: u8) -> Team {
        let roster = (0..3)
            .map(|i| Player::new(format!("{}-{}", id, i), PlayerAttributes::uniform(level)))
            .collect();
        Team::new(id, roster, 50).unwrap()
    }

    #[test]
    fn test_game_never_tied() {
        let sim = GameSimulator::default();
        let home = make_team("H", 60);
        let away = make_team("A", 60);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for n in 1..=300 {
            let ctx = GameContext {
                game_number: n,
                is_elimination: n % 2 == 0,
            };
            let game = sim.simulate_game(&home, &away, ctx, &mut rng);
            assert_ne!(game.home_score, game.away_score);
            assert_eq!(game.home_stats.len(), 3);
            assert_eq!(game.away_stats.len(), 3);
        }
    }

    #[test]
    fn test_stat_lines_match_score() {
        let sim = GameSimulator::default();
        let home = make_team("H", 70);
        let away = make_team("A", 55);
        let mut rng = ChaCha8Rng::seed_from_u64(12);

        for _ in 0..100 {
            let game = sim.simulate_game(&home, &away, GameContext::default(), &mut rng);
            let home_goals: u32 = game.home_stats.iter().map(|s| s.goals).sum();
            let away_goals: u32 = game.away_stats.iter().map(|s| s.goals).sum();
            assert_eq!(home_goals, game.home_score);
            assert_eq!(away_goals, game.away_score);

            for stat in game.home_stats.iter().chain(&game.away_stats) {
                assert!(stat.goals <= stat.shots);
                assert!((1.0..=10.0).contains(&stat.rating));
            }
        }
    }

    #[test]
    fn test_overtime_happens() {
        let sim = GameSimulator::default();
        let home = make_team("H", 50);
        let away = make_team("A", 50);
        let mut rng = ChaCha8Rng::seed_from_u64(13);

        let overtime_games = (0..500)
            .map(|_| sim.simulate_game(&home, &away, GameContext::default(), &mut rng))
            .filter(|g| g.overtime)
            .count();
        assert!(overtime_games > 0);
    }

    #[test]
    fn test_stronger_team_wins_more() {
        let sim = GameSimulator::default();
        let strong = make_team("S", 90);
        let weak = make_team("W", 30);
        let mut rng = ChaCha8Rng::seed_from_u64(14);

        let strong_wins = (0..200)
            .map(|_| sim.simulate_game(&strong, &weak, GameContext::default(), &mut rng))
            .filter(|g| g.winner() == Side::Home)
            .count();
        assert!(strong_wins > 120, "strong side won only {}", strong_wins);
    }

    #[test]
    fn test_same_seed_same_game() {
        let sim = GameSimulator::default();
        let home = make_team("H", 65);
        let away = make_team("A", 60);

        let g1 = sim.simulate_game(&home, &away, GameContext::default(), &mut ChaCha8Rng::seed_from_u64(99));
        let g2 = sim.simulate_game(&home, &away, GameContext::default(), &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_ratings() {
        let mut stats = vec![PlayerMatchStats::new("a"), PlayerMatchStats::new("b")];
        stats[0].goals = 2;
        stats[0].shots = 3;
        stats[0].assists = 1;
        stats[1].shots = 10;

        calculate_ratings(&mut stats, 3, 1);
        // 6 + 1.6 + 0.4 + 0.5 (efficiency) + 0.5 (win)
        assert!((stats[0].rating - 9.0).abs() < 1e-10);
        // 6 - 0.3 (efficiency) + 0.5 (win)
        assert!((stats[1].rating - 6.2).abs() < 1e-10);

        let mut loser = vec![PlayerMatchStats::new("c")];
        calculate_ratings(&mut loser, 0, 2);
        assert!((loser[0].rating - 5.7).abs() < 1e-10);
    }

    #[test]
    fn test_rating_capped() {
        let mut stats = vec![PlayerMatchStats::new("a")];
        stats[0].goals = 8;
        stats[0].shots = 8;
        calculate_ratings(&mut stats, 8, 0);
        assert_eq!(stats[0].rating, 10.0);
    }

    #[test]
    fn test_empty_lineups_still_finish() {
        let sim = GameSimulator::default();
        let empty = |id: &str| Team {
            id: id.to_string(),
            roster: Vec::new(),
            chemistry: 50,
        };
        let home = empty("H");
        let away = empty("A");

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let game = sim.simulate_game(&home, &away, GameContext::default(), &mut rng);
            assert_ne!(game.home_score, game.away_score);
            assert_eq!(game.home_score + game.away_score, 1);
            assert!(game.overtime);
            assert!(game.home_stats.is_empty());
        }
    }

    #[test]
    fn test_one_empty_lineup_loses_eventually() {
        let sim = GameSimulator::default();
        let home = Team {
            id: "H".to_string(),
            roster: Vec::new(),
            chemistry: 50,
        };
        let away = make_team("A", 60);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let game = sim.simulate_game(&home, &away, GameContext::default(), &mut rng);
        assert_eq!(game.home_score, 0);
        assert!(game.away_score > 0);
    }

    #[test]
    fn test_saves_distribution() {
        let sim = GameSimulator::default();
        let players: Vec<Player> = (0..3)
            .map(|i| Player::new(format!("p{}", i), PlayerAttributes::default()))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(15);

        // 3 goals against -> 10 shots -> 7 saves, roughly 2 each plus jitter
        let mut stats: Vec<PlayerMatchStats> = players.iter().map(|p| PlayerMatchStats::new(&p.id)).collect();
        sim.distribute_saves(&mut stats, 3, &players, &mut rng);
        for stat in &stats {
            assert!(stat.saves <= 3);
        }

        // Shutout: 8-15 shots, all saved
        let mut stats: Vec<PlayerMatchStats> = players.iter().map(|p| PlayerMatchStats::new(&p.id)).collect();
        sim.distribute_saves(&mut stats, 0, &players, &mut rng);
        let total: u32 = stats.iter().map(|s| s.saves).sum();
        assert!((3..=18).contains(&total));
    }
}
