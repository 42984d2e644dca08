use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use league_core::game::{GameContext, GameSimulator};
use league_core::player::{Player, PlayerAttributes};
use league_core::regional::RegionalTournament;
use league_core::runner::play_regional;
use league_core::series::SeriesSimulator;
use league_core::team::Team;
use league_core::make_rng;

fn create_team(id: &str, level: u8) -> Team {
    let roster = (0..3)
        .map(|i| Player::new(format!("{}-{}", id, i), PlayerAttributes::uniform(level)))
        .collect();
    Team::new(id, roster, 50).unwrap()
}

fn create_test_teams() -> (Team, Team) {
    (create_team("Falcons", 72), create_team("Ravens", 65))
}

fn create_32_team_field() -> HashMap<String, Team> {
    (0..32u8)
        .map(|i| {
            let name = format!("Team{}", i);
            let level = 40 + i; // 40 to 71
            (name.clone(), create_team(&name, level))
        })
        .collect()
}

fn bench_simulate_game(c: &mut Criterion) {
    let (home, away) = create_test_teams();
    let sim = GameSimulator::default();
    let mut rng = make_rng(Some(42));

    c.bench_function("simulate_game", |b| {
        b.iter(|| sim.simulate_game(black_box(&home), black_box(&away), GameContext::default(), &mut rng))
    });
}

fn bench_simulate_series(c: &mut Criterion) {
    let (home, away) = create_test_teams();
    let sim = SeriesSimulator::default();
    let mut rng = make_rng(Some(42));

    c.bench_function("simulate_series_bo7", |b| {
        b.iter(|| sim.simulate_series(black_box(&home), black_box(&away), 7, &mut rng))
    });
}

fn bench_full_regional(c: &mut Criterion) {
    let teams = create_32_team_field();
    let mut ids: Vec<String> = teams.keys().cloned().collect();
    ids.sort();
    let sim = SeriesSimulator::default();

    c.bench_function("regional_32_team_full", |b| {
        b.iter(|| {
            let mut rng = make_rng(Some(42));
            let mut regional = RegionalTournament::new(ids.clone(), &mut rng).unwrap();
            play_regional(&mut regional, black_box(&teams), &sim, &mut rng).unwrap();
            regional
        })
    });
}

criterion_group!(benches, bench_simulate_game, bench_simulate_series, bench_full_regional,);
criterion_main!(benches);
