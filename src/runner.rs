//! Drives brackets with the match engine.
//!
//! Series within a round are independent, so they are simulated in parallel.
//! Each one gets its own generator seeded from the caller's RNG before the
//! parallel section, and results are recorded in matchup order, so a run is
//! fully determined by the caller's seed.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::double_elim::DoubleEliminationBracket;
use crate::error::{TournamentError, TournamentResult};
use crate::regional::{RegionalTournament, Stage};
use crate::series::{SeriesResult, SeriesSimulator};
use crate::swiss::SwissBracket;
use crate::team::Team;

fn lookup<'a>(teams: &'a HashMap<String, Team>, id: &str) -> TournamentResult<&'a Team> {
    teams
        .get(id)
        .ok_or_else(|| TournamentError::MissingTeam(id.to_string()))
}

/// Simulate a batch of `(home, away)` series.
pub fn simulate_matchups<R: Rng + ?Sized>(
    matchups: &[(String, String)],
    teams: &HashMap<String, Team>,
    best_of: u32,
    simulator: &SeriesSimulator,
    rng: &mut R,
) -> TournamentResult<Vec<SeriesResult>> {
    let jobs = matchups
        .iter()
        .map(|(home, away)| Ok((lookup(teams, home)?, lookup(teams, away)?, rng.gen::<u64>())))
        .collect::<TournamentResult<Vec<(&Team, &Team, u64)>>>()?;

    Ok(jobs
        .par_iter()
        .map(|(home, away, seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(*seed);
            simulator.simulate_series(home, away, best_of, &mut rng)
        })
        .collect())
}

/// Pair, play and record one Swiss round.
///
/// Every active team must have a roster in `teams`; this is checked before
/// pairing so a failure leaves the bracket untouched.
pub fn play_swiss_round<R: Rng + ?Sized>(
    bracket: &mut SwissBracket,
    teams: &HashMap<String, Team>,
    simulator: &SeriesSimulator,
    rng: &mut R,
) -> TournamentResult<Vec<SeriesResult>> {
    for team in bracket.active_teams() {
        lookup(teams, &team)?;
    }
    let matchups = bracket.generate_round_matchups(rng);
    let results = simulate_matchups(&matchups, teams, bracket.best_of(), simulator, rng)?;
    for series in &results {
        bracket.record_result(
            &series.home_team_id,
            &series.away_team_id,
            series.home_wins,
            series.away_wins,
        )?;
    }
    Ok(results)
}

/// Play Swiss rounds until every team has qualified or been eliminated.
pub fn play_swiss_bracket<R: Rng + ?Sized>(
    bracket: &mut SwissBracket,
    teams: &HashMap<String, Team>,
    simulator: &SeriesSimulator,
    rng: &mut R,
) -> TournamentResult<Vec<SeriesResult>> {
    let mut all = Vec::new();
    while !bracket.is_complete() {
        all.extend(play_swiss_round(bracket, teams, simulator, rng)?);
    }
    Ok(all)
}

/// Play the double-elimination bracket phase by phase until a champion is crowned.
pub fn play_double_elim<R: Rng + ?Sized>(
    bracket: &mut DoubleEliminationBracket,
    teams: &HashMap<String, Team>,
    simulator: &SeriesSimulator,
    rng: &mut R,
) -> TournamentResult<Vec<SeriesResult>> {
    let mut all = Vec::new();
    while !bracket.is_complete() {
        let pending = bracket.get_next_matches();
        let matchups: Vec<(String, String)> = pending
            .iter()
            .map(|m| (m.team1.clone(), m.team2.clone()))
            .collect();
        let results = simulate_matchups(&matchups, teams, bracket.best_of(), simulator, rng)?;

        for (m, series) in pending.iter().zip(&results) {
            let winner_games = series.home_wins.max(series.away_wins);
            let loser_games = series.home_wins.min(series.away_wins);
            bracket.record(m.match_id, series.winner_id(), winner_games, loser_games)?;
        }
        all.extend(results);
    }
    Ok(all)
}

/// Run a regional from its current stage to completion.
pub fn play_regional<R: Rng + ?Sized>(
    regional: &mut RegionalTournament,
    teams: &HashMap<String, Team>,
    simulator: &SeriesSimulator,
    rng: &mut R,
) -> TournamentResult<()> {
    while !regional.is_complete() {
        match regional.stage() {
            Stage::SwissGroups | Stage::SwissPlayoffs => {
                for bracket in regional.active_swiss_brackets_mut() {
                    play_swiss_bracket(bracket, teams, simulator, rng)?;
                }
            }
            Stage::DoubleElim => {
                if let Some(bracket) = regional.double_elim_mut() {
                    play_double_elim(bracket, teams, simulator, rng)?;
                }
            }
            Stage::Complete => break,
        }
        regional.advance_stage()?;
    }
    Ok(())
}
