//! Error types for roster input, brackets and tournaments.

use thiserror::Error;

use crate::regional::Stage;

/// Problems with roster or attribute input supplied by a collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// Team has no players to field
    #[error("Team {0} has an empty roster")]
    EmptyRoster(String),

    /// Roster larger than the allowed maximum
    #[error("Team {team} has {found} players, at most 5 allowed")]
    TooManyPlayers { team: String, found: usize },

    /// Attribute outside 1-99
    #[error("Attribute {name} out of range: {value}")]
    AttributeOutOfRange { name: String, value: i64 },

    /// Attribute name not part of the bundle
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
}

/// Bracket construction and result-recording failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// Swiss bracket built with no teams
    #[error("Bracket requires at least one team")]
    NoTeams,

    /// Wrong number of teams for a fixed-size format
    #[error("Invalid team count: expected {expected}, found {found}")]
    InvalidTeamCount { expected: usize, found: usize },

    /// No slot with this id
    #[error("Match {0} not found")]
    MatchNotFound(String),

    /// Slot exists but is waiting on upstream results, or already decided
    #[error("Match {0} is not ready to be played")]
    MatchNotReady(String),

    /// Declared winner is not one of the slot's teams
    #[error("Team {team} is not playing in match {match_id}")]
    InvalidWinner { match_id: String, team: String },

    /// Team id not registered in the bracket
    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    /// Team already qualified or eliminated
    #[error("Team {0} is no longer active")]
    TeamNotActive(String),

    /// A team cannot play itself
    #[error("Team {0} cannot play itself")]
    SelfMatch(String),

    /// Series results cannot be level
    #[error("Result between {team1} and {team2} has no winner")]
    TiedResult { team1: String, team2: String },
}

/// Regional orchestration failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    /// Regional needs exactly 32 entrants
    #[error("Regional requires {expected} teams, got {found}")]
    InvalidEntrantCount { expected: usize, found: usize },

    /// Active bracket has not finished
    #[error("Stage {0} is not complete")]
    StageNotComplete(Stage),

    /// Nothing left to advance
    #[error("Tournament is already complete")]
    AlreadyComplete,

    /// Team id has no roster in the caller-supplied map
    #[error("No roster supplied for team {0}")]
    MissingTeam(String),

    #[error(transparent)]
    Bracket(#[from] BracketError),
}

/// Result type for roster input
pub type RosterResult<T> = Result<T, RosterError>;

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
