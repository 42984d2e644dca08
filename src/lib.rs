//! League Core - esports league simulation engine.
//!
//! Provides a stochastic match engine for 3v3 car-soccer teams and the
//! bracket formats used to run a regional: Swiss stages, an 8-team
//! double-elimination bracket and the 32-team regional that chains them.
//! Python bindings via PyO3 are available behind the `python` feature.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod chances;
pub mod config;
pub mod constants;
pub mod double_elim;
pub mod error;
pub mod game;
pub mod player;
pub mod regional;
pub mod runner;
pub mod series;
pub mod strength;
pub mod swiss;
pub mod team;

#[cfg(feature = "python")]
mod python;

pub use config::{MatchConfig, RegionalConfig, SwissConfig};
pub use constants::{regional_points, REGIONAL_POINTS};
pub use double_elim::{DoubleEliminationBracket, MatchId, PendingMatch, Phase};
pub use error::{BracketError, RosterError, TournamentError};
pub use game::{GameContext, GameResult, GameSimulator, PlayerMatchStats, Side};
pub use player::{Player, PlayerAttributes};
pub use regional::{RegionalTournament, Stage};
pub use runner::{play_double_elim, play_regional, play_swiss_bracket, play_swiss_round, simulate_matchups};
pub use series::{SeriesResult, SeriesSimulator};
pub use strength::TeamStrength;
pub use swiss::{SwissBracket, SwissRecord};
pub use team::Team;

/// Build the engine's random source.
///
/// A fixed seed reproduces every game, pairing and shuffle; `None` draws
/// from OS entropy.
pub fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
