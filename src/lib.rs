//! Turn-passing "ping-pong" games.
//!
//! Participants are wired into a ring and take turns strictly one after another:
//! only the holder of the token acts, and on its turn it passes the token to its successor.
//! The same protocol runs with [thread per participant][thread_mode],
//! [task per participant][async_mode], or [without concurrency][sequential_mode].

// Add warnings for missing public and private documentation.
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod common;

pub mod async_mode;
pub mod sequential_mode;
pub mod thread_mode;

pub use common::{
    cancel::CancelToken,
    config::{GameConfig, Mode, PlayerConfig, RunSettings},
    error::{GameError, GameResult},
    outcome::{Outcome, TurnEvent},
    participant::{Handoff, Participant, ParticipantId, Phase, Wait},
    roster::{Roster, Wiring},
    sink::{ConsoleSink, RecordingSink, ReportFormat, Sink, SinkGuard, SinkWrapper},
};

/// Run game described by the config in its [mode][Mode].
///
/// # Errors
///
/// - Wiring and config errors, before anything is launched.
/// - [`GameError::NestedRuntime`] if called in [async][Mode::Async] mode
///   from inside of tokio runtime. There use [`async_mode::Game`] directly.
pub fn run<S: Sink + 'static>(config: &GameConfig, sink: SinkWrapper<S>) -> GameResult<Outcome> {
    config.validate()?;
    let (roster, initial) = config.roster()?;
    match config.mode {
        Mode::Thread => {
            let game = thread_mode::Game::start(roster, initial, sink, config.settings())?;
            Ok(game.await_completion(config.timeout()))
        }
        Mode::Async => async_mode::run(roster, initial, sink, config.settings(), config.timeout()),
        Mode::Sequential => sequential_mode::play(roster, initial, sink),
    }
}
