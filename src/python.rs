use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

use crate::constants::REGIONAL_POINTS;
use crate::player::{Player, PlayerAttributes};
use crate::regional::RegionalTournament;
use crate::runner::play_regional;
use crate::series::{SeriesResult, SeriesSimulator};
use crate::team::Team;
use crate::make_rng;

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A team roster as seen from Python.
#[pyclass(name = "Team")]
#[derive(Clone)]
pub struct PyTeam {
    inner: Team,
}

#[pymethods]
impl PyTeam {
    /// Build a team from `(player_id, {attribute: value})` pairs.
    #[new]
    #[pyo3(signature = (id, players, chemistry = 50))]
    pub fn new(id: String, players: Vec<(String, HashMap<String, i64>)>, chemistry: u8) -> PyResult<Self> {
        let roster = players
            .into_iter()
            .map(|(player_id, attrs)| {
                let attributes = PlayerAttributes::from_pairs(attrs.iter().map(|(k, v)| (k.as_str(), *v)))?;
                Ok(Player::new(player_id, attributes))
            })
            .collect::<Result<Vec<_>, crate::error::RosterError>>()
            .map_err(value_error)?;
        let inner = Team::new(id, roster, chemistry).map_err(value_error)?;
        Ok(PyTeam { inner })
    }

    #[getter]
    pub fn id(&self) -> String {
        self.inner.id.clone()
    }

    #[getter]
    pub fn chemistry(&self) -> u8 {
        self.inner.chemistry
    }

    pub fn team_overall(&self) -> f64 {
        self.inner.team_overall()
    }

    fn __repr__(&self) -> String {
        format!("Team({}, {} players)", self.inner.id, self.inner.roster.len())
    }
}

/// Outcome of a simulated series.
#[pyclass(name = "SeriesResult")]
#[derive(Clone)]
pub struct PySeriesResult {
    inner: SeriesResult,
}

#[pymethods]
impl PySeriesResult {
    #[getter]
    pub fn home_team_id(&self) -> String {
        self.inner.home_team_id.clone()
    }

    #[getter]
    pub fn away_team_id(&self) -> String {
        self.inner.away_team_id.clone()
    }

    #[getter]
    pub fn home_wins(&self) -> u32 {
        self.inner.home_wins
    }

    #[getter]
    pub fn away_wins(&self) -> u32 {
        self.inner.away_wins
    }

    #[getter]
    pub fn winner_id(&self) -> String {
        self.inner.winner_id().to_string()
    }

    #[getter]
    pub fn score(&self) -> String {
        self.inner.score()
    }

    /// `(home, away)` goals for each game played
    #[getter]
    pub fn game_scores(&self) -> Vec<(u32, u32)> {
        self.inner.games.iter().map(|g| (g.home_score, g.away_score)).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "SeriesResult({} {} {})",
            self.inner.home_team_id,
            self.inner.score(),
            self.inner.away_team_id
        )
    }
}

/// Seeded match engine.
#[pyclass]
pub struct MatchEngine {
    simulator: SeriesSimulator,
    rng: ChaCha8Rng,
}

#[pymethods]
impl MatchEngine {
    #[new]
    #[pyo3(signature = (seed = None))]
    pub fn new(seed: Option<u64>) -> Self {
        MatchEngine {
            simulator: SeriesSimulator::default(),
            rng: make_rng(seed),
        }
    }

    #[pyo3(signature = (home, away, best_of = 5))]
    pub fn simulate_series(&mut self, home: &PyTeam, away: &PyTeam, best_of: u32) -> PySeriesResult {
        PySeriesResult {
            inner: self
                .simulator
                .simulate_series(&home.inner, &away.inner, best_of, &mut self.rng),
        }
    }
}

/// A 32-team regional driven to completion from Python.
#[pyclass(name = "RegionalTournament")]
pub struct PyRegionalTournament {
    teams: HashMap<String, Team>,
    regional: RegionalTournament,
    simulator: SeriesSimulator,
    rng: ChaCha8Rng,
}

#[pymethods]
impl PyRegionalTournament {
    #[new]
    #[pyo3(signature = (teams, seed = None))]
    pub fn new(teams: Vec<PyTeam>, seed: Option<u64>) -> PyResult<Self> {
        let mut rng = make_rng(seed);
        let ids = teams.iter().map(|t| t.inner.id.clone()).collect();
        let regional = RegionalTournament::new(ids, &mut rng).map_err(value_error)?;
        Ok(PyRegionalTournament {
            teams: teams.into_iter().map(|t| (t.inner.id.clone(), t.inner)).collect(),
            regional,
            simulator: SeriesSimulator::default(),
            rng,
        })
    }

    /// Play every remaining stage.
    pub fn play(&mut self) -> PyResult<()> {
        play_regional(&mut self.regional, &self.teams, &self.simulator, &mut self.rng).map_err(value_error)
    }

    #[getter]
    pub fn current_stage(&self) -> String {
        self.regional.stage_name().to_string()
    }

    #[getter]
    pub fn final_placements(&self) -> HashMap<String, u32> {
        self.regional
            .final_placements()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    #[getter]
    pub fn points(&self) -> HashMap<String, u32> {
        self.regional.points().iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    /// `(team_id, placement, points)` sorted by placement
    pub fn summary(&self) -> Vec<(String, u32, u32)> {
        self.regional
            .standings_summary()
            .into_iter()
            .map(|e| (e.team_id, e.placement, e.points))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "RegionalTournament({} teams, {})",
            self.regional.teams().len(),
            self.regional.stage_name()
        )
    }
}

/// Python module definition
#[pymodule]
fn league_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Classes
    m.add_class::<PyTeam>()?;
    m.add_class::<PySeriesResult>()?;
    m.add_class::<MatchEngine>()?;
    m.add_class::<PyRegionalTournament>()?;

    // Constants
    m.add("REGIONAL_POINTS", REGIONAL_POINTS.to_vec())?;

    Ok(())
}
