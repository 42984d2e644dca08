/// Property-based tests for the match engine using proptest
///
/// Arbitrary seeds and attribute bundles must always produce well-formed
/// games and series.
use league_core::{make_rng, GameContext, GameSimulator, Player, PlayerAttributes, SeriesSimulator, Team};
use proptest::prelude::*;

// Strategy to generate a player with a base level and independent consistency/clutch
fn player_strategy(id: String) -> impl Strategy<Value = Player> {
    (1u8..=99, 1u8..=99, 1u8..=99, 1u8..=99).prop_map(move |(level, consistency, clutch, teamwork)| {
        let mut attrs = PlayerAttributes::uniform(level);
        attrs.consistency = consistency;
        attrs.clutch = clutch;
        attrs.teamwork = teamwork;
        Player::new(id.clone(), attrs)
    })
}

// Strategy to generate a team with 1-5 players and arbitrary chemistry
fn team_strategy(id: &'static str) -> impl Strategy<Value = Team> {
    (1usize..=5, 0u8..=100).prop_flat_map(move |(size, chemistry)| {
        let players: Vec<_> = (0..size).map(|i| player_strategy(format!("{}-{}", id, i))).collect();
        players.prop_map(move |roster| Team::new(id, roster, chemistry).unwrap())
    })
}

fn best_of_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![Just(1u32), Just(3), Just(5), Just(7)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_series_shape(
        home in team_strategy("HOME"),
        away in team_strategy("AWAY"),
        best_of in best_of_strategy(),
        seed in any::<u64>(),
    ) {
        let sim = SeriesSimulator::default();
        let result = sim.simulate_series(&home, &away, best_of, &mut make_rng(Some(seed)));

        let needed = best_of / 2 + 1;
        prop_assert_eq!((result.home_wins + result.away_wins) as usize, result.games.len());
        prop_assert_eq!(result.home_wins.max(result.away_wins), needed);
        prop_assert!(result.home_wins.min(result.away_wins) < needed);
        for game in &result.games {
            prop_assert_ne!(game.home_score, game.away_score);
        }
    }

    #[test]
    fn test_series_deterministic(
        home in team_strategy("HOME"),
        away in team_strategy("AWAY"),
        seed in any::<u64>(),
    ) {
        let sim = SeriesSimulator::default();
        let r1 = sim.simulate_series(&home, &away, 5, &mut make_rng(Some(seed)));
        let r2 = sim.simulate_series(&home, &away, 5, &mut make_rng(Some(seed)));
        prop_assert_eq!(r1, r2);
    }

    #[test]
    fn test_game_stat_lines(
        home in team_strategy("HOME"),
        away in team_strategy("AWAY"),
        elimination in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let sim = GameSimulator::default();
        let ctx = GameContext { game_number: 1, is_elimination: elimination };
        let game = sim.simulate_game(&home, &away, ctx, &mut make_rng(Some(seed)));

        prop_assert_eq!(game.home_stats.len(), home.active_roster().len());
        prop_assert_eq!(game.away_stats.len(), away.active_roster().len());

        let home_goals: u32 = game.home_stats.iter().map(|s| s.goals).sum();
        let away_goals: u32 = game.away_stats.iter().map(|s| s.goals).sum();
        prop_assert_eq!(home_goals, game.home_score);
        prop_assert_eq!(away_goals, game.away_score);

        for stats in game.home_stats.iter().chain(&game.away_stats) {
            prop_assert!(stats.goals <= stats.shots);
            prop_assert!((1.0..=10.0).contains(&stats.rating));
        }
        let home_assists: u32 = game.home_stats.iter().map(|s| s.assists).sum();
        prop_assert!(home_assists <= game.home_score);
    }
}
