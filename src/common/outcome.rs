//! Definition of [`TurnEvent`] and [`Outcome`].

use serde::{Deserialize, Serialize};

use super::error::{GameError, GameResult};

/// Emitted once per turn, while the acting participant holds the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Global position of the turn in the game, starting from one.
    pub seq: u64,
    /// Identity of the acting participant.
    pub identity: String,
    /// Turn number of the acting participant, starting from one.
    pub turn: u32,
}

/// Represents the way game ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Every participant spent all of its turns.
    Completed {
        /// Total number of turns.
        events: u64,
    },
    /// Game was cancelled by the caller.
    Cancelled {
        /// Number of turns made before cancellation.
        events: u64,
        /// Participants which did not finish.
        unfinished: Vec<String>,
    },
    /// Game did not complete in the given time.
    TimedOut {
        /// Number of turns made before the timeout.
        events: u64,
        /// Participants which did not finish.
        unfinished: Vec<String>,
    },
    /// Token came to participant without turns, while others still had turns.
    Stalled {
        /// Number of turns made.
        events: u64,
        /// Participants which did not finish.
        unfinished: Vec<String>,
    },
}

impl Outcome {
    /// Number of turns made during the game.
    pub fn events(&self) -> u64 {
        match self {
            Outcome::Completed { events }
            | Outcome::Cancelled { events, .. }
            | Outcome::TimedOut { events, .. }
            | Outcome::Stalled { events, .. } => *events,
        }
    }

    /// Allows to check whether every participant finished.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    /// Participants which did not finish.
    pub fn unfinished(&self) -> &[String] {
        match self {
            Outcome::Completed { .. } => &[],
            Outcome::Cancelled { unfinished, .. }
            | Outcome::TimedOut { unfinished, .. }
            | Outcome::Stalled { unfinished, .. } => unfinished,
        }
    }

    /// Turns outcome into result with the number of turns on completion.
    pub fn into_result(self) -> GameResult<u64> {
        match self {
            Outcome::Completed { events } => Ok(events),
            Outcome::Cancelled { unfinished, .. } => Err(GameError::Cancelled { unfinished }),
            Outcome::TimedOut { unfinished, .. } => Err(GameError::Timeout { unfinished }),
            Outcome::Stalled { unfinished, .. } => Err(GameError::Stalled { unfinished }),
        }
    }
}
