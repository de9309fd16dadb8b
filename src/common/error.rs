//! Definition of [`GameError`] and [`GameResult`].

use std::io;

use thiserror::Error;

use super::participant::ParticipantId;

////////////////////////////////////////////////////////////////////////////////

/// Represents errors which can appear while wiring or running a game.
#[derive(Debug, Error)]
pub enum GameError {
    /// Wait for the turn was interrupted, because the coordination state
    /// was poisoned by a panicked peer.
    #[error("wait of participant '{participant}' was interrupted")]
    InterruptedWait {
        /// Identity of the participant which was waiting.
        participant: String,
    },
    /// Successor of the participant was never linked.
    #[error("participant '{participant}' has no next participant")]
    MissingWiring {
        /// Identity of the unlinked participant.
        participant: String,
    },
    /// Links do not form exactly one cycle through every participant.
    #[error("links do not form a single cycle, broken at participant '{participant}'")]
    BrokenCycle {
        /// Identity of the first participant outside of the cycle.
        participant: String,
    },
    /// Participant was linked twice.
    #[error("participant '{participant}' is already linked")]
    AlreadyLinked {
        /// Identity of the participant.
        participant: String,
    },
    /// Id does not belong to the roster.
    #[error("unknown participant {id}")]
    UnknownParticipant {
        /// Unknown id.
        id: ParticipantId,
    },
    /// Roster has no participants.
    #[error("roster is empty")]
    EmptyRoster,
    /// Handoff was requested by participant which does not hold the token.
    #[error("participant '{participant}' does not hold the token")]
    NotTokenHolder {
        /// Identity of the participant.
        participant: String,
    },
    /// Handoff was requested by the token holder which has no turns left.
    #[error("participant '{participant}' has no turns left")]
    NoTurnsLeft {
        /// Identity of the participant.
        participant: String,
    },
    /// Some participants did not finish in the given time.
    #[error("timed out waiting for {unfinished:?}")]
    Timeout {
        /// Identities of participants which did not finish.
        unfinished: Vec<String>,
    },
    /// Some participants were cancelled before they finished.
    #[error("cancelled before {unfinished:?} finished")]
    Cancelled {
        /// Identities of participants which did not finish.
        unfinished: Vec<String>,
    },
    /// Token came to a participant without turns, while others still had turns.
    #[error("game stalled, {unfinished:?} still have turns")]
    Stalled {
        /// Identities of participants which did not finish.
        unfinished: Vec<String>,
    },
    /// Thread of participant can not be spawned.
    #[error("can not spawn participant thread: {0}")]
    Spawn(#[source] io::Error),
    /// Tokio runtime can not be created.
    #[error("can not create runtime: {0}")]
    Runtime(#[source] io::Error),
    /// Blocking run was requested from inside of tokio runtime.
    ///
    /// Inside of a runtime use [`Game::start`][crate::async_mode::Game::start]
    /// and [`Game::await_completion`][crate::async_mode::Game::await_completion].
    #[error("can not block inside of tokio runtime, start the game and await its completion")]
    NestedRuntime,
    /// Config values are not valid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Config file can not be read.
    #[error("can not read config: {0}")]
    ConfigRead(#[from] io::Error),
    /// Config file is not valid json.
    #[error("can not parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

////////////////////////////////////////////////////////////////////////////////

/// Represents result of game operations.
pub type GameResult<T> = Result<T, GameError>;
