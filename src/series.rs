use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::game::{GameContext, GameResult, GameSimulator, PlayerMatchStats, Side};
use crate::team::Team;

/// Games a side must win to take a best-of-N series.
pub fn wins_needed(best_of: u32) -> u32 {
    best_of / 2 + 1
}

/// Result of a best-of-N series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_wins: u32,
    pub away_wins: u32,
    pub games: Vec<GameResult>,
    pub best_of: u32,
}

impl SeriesResult {
    pub fn winner_id(&self) -> &str {
        if self.home_wins > self.away_wins {
            &self.home_team_id
        } else {
            &self.away_team_id
        }
    }

    pub fn loser_id(&self) -> &str {
        if self.home_wins > self.away_wins {
            &self.away_team_id
        } else {
            &self.home_team_id
        }
    }

    /// Series score as "home-away", e.g. "3-1"
    pub fn score(&self) -> String {
        format!("{}-{}", self.home_wins, self.away_wins)
    }

    pub fn wins_needed(&self) -> u32 {
        wins_needed(self.best_of)
    }

    /// Goals scored across the series by one team. Zero for a team not in it.
    pub fn total_goals(&self, team_id: &str) -> u32 {
        if team_id == self.home_team_id {
            self.games.iter().map(|g| g.home_score).sum()
        } else if team_id == self.away_team_id {
            self.games.iter().map(|g| g.away_score).sum()
        } else {
            0
        }
    }

    /// Per-player totals for one team across all games. Ratings are averaged.
    pub fn player_totals(&self, team_id: &str) -> Vec<PlayerMatchStats> {
        let side = if team_id == self.home_team_id {
            Side::Home
        } else if team_id == self.away_team_id {
            Side::Away
        } else {
            return Vec::new();
        };

        let mut totals: Vec<PlayerMatchStats> = Vec::new();
        for game in &self.games {
            let lines = match side {
                Side::Home => &game.home_stats,
                Side::Away => &game.away_stats,
            };
            for line in lines {
                match totals.iter_mut().find(|t| t.player_id == line.player_id) {
                    Some(total) => {
                        total.goals += line.goals;
                        total.assists += line.assists;
                        total.saves += line.saves;
                        total.shots += line.shots;
                        total.demos += line.demos;
                        total.rating += line.rating;
                    }
                    None => totals.push(line.clone()),
                }
            }
        }

        let games = self.games.len().max(1) as f64;
        for total in &mut totals {
            total.rating /= games;
        }
        totals
    }
}

/// Plays games until one side reaches the series win threshold.
#[derive(Clone, Debug, Default)]
pub struct SeriesSimulator {
    pub games: GameSimulator,
}

impl SeriesSimulator {
    pub fn new(config: MatchConfig) -> Self {
        SeriesSimulator {
            games: GameSimulator::new(config),
        }
    }

    /// Simulate a best-of-N series between two teams.
    pub fn simulate_series<R: Rng + ?Sized>(
        &self,
        home: &Team,
        away: &Team,
        best_of: u32,
        rng: &mut R,
    ) -> SeriesResult {
        let needed = wins_needed(best_of);
        let mut home_wins = 0;
        let mut away_wins = 0;
        let mut games = Vec::new();

        while home_wins < needed && away_wins < needed {
            let ctx = GameContext {
                game_number: games.len() as u32 + 1,
                is_elimination: home_wins == needed - 1 || away_wins == needed - 1,
            };
            let game = self.games.simulate_game(home, away, ctx, rng);
            match game.winner() {
                Side::Home => home_wins += 1,
                Side::Away => away_wins += 1,
            }
            games.push(game);
        }

        debug!(
            "Series {} vs {} (bo{}) finished {}-{}",
            home.id, away.id, best_of, home_wins, away_wins
        );

        SeriesResult {
            home_team_id: home.id.clone(),
            away_team_id: away.id.clone(),
            home_wins,
            away_wins,
            games,
            best_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Player, PlayerAttributes};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn make_team(id: &str, level: u8) -> Team {
        let roster = (0..4)
            .map(|i| Player::new(format!("{}-{}", id, i), PlayerAttributes::uniform(level)))
            .collect();
        Team::new(id, roster, 50).unwrap()
    }

    #[test]
    fn test_wins_needed() {
        assert_eq!(wins_needed(1), 1);
        assert_eq!(wins_needed(3), 2);
        assert_eq!(wins_needed(5), 3);
        assert_eq!(wins_needed(7), 4);
    }

    #[test]
    fn test_series_invariants() {
        let sim = SeriesSimulator::default();
        let home = make_team("H", 62);
        let away = make_team("A", 58);
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        for best_of in [1, 3, 5, 7] {
            for _ in 0..25 {
                let series = sim.simulate_series(&home, &away, best_of, &mut rng);
                assert_eq!((series.home_wins + series.away_wins) as usize, series.games.len());
                assert_eq!(series.home_wins.max(series.away_wins), wins_needed(best_of));
                assert!(series.home_wins.min(series.away_wins) < wins_needed(best_of));
                assert!(series.games.len() as u32 <= best_of);
            }
        }
    }

    #[test]
    fn test_winner_and_loser() {
        let sim = SeriesSimulator::default();
        let home = make_team("H", 60);
        let away = make_team("A", 60);
        let series = sim.simulate_series(&home, &away, 5, &mut ChaCha8Rng::seed_from_u64(22));

        assert_ne!(series.winner_id(), series.loser_id());
        assert!(["H", "A"].contains(&series.winner_id()));
        assert_eq!(series.score(), format!("{}-{}", series.home_wins, series.away_wins));
        assert_eq!(series.total_goals("nobody"), 0);
    }

    #[test]
    fn test_player_totals() {
        let sim = SeriesSimulator::default();
        let home = make_team("H", 60);
        let away = make_team("A", 55);
        let series = sim.simulate_series(&home, &away, 7, &mut ChaCha8Rng::seed_from_u64(23));

        let totals = series.player_totals("H");
        // Substitute never plays
        assert_eq!(totals.len(), 3);
        let goals: u32 = totals.iter().map(|t| t.goals).sum();
        assert_eq!(goals, series.total_goals("H"));
        for total in &totals {
            assert!((1.0..=10.0).contains(&total.rating));
        }
        assert!(series.player_totals("X").is_empty());
    }
}
