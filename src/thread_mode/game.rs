//! Definition of [`Game`] which runs every participant on its own thread.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::common::{
    cancel::CancelToken,
    config::RunSettings,
    error::{GameError, GameResult},
    outcome::Outcome,
    participant::ParticipantId,
    roster::Roster,
    sink::{Sink, SinkWrapper},
};

use super::{
    latch::CountdownLatch,
    runner::{self, Seat},
    token::TurnToken,
};

/// Stops the game from another thread, while its owner awaits completion.
#[derive(Clone)]
pub struct Stopper {
    /// Cancel tokens of the spawned participants.
    cancels: Vec<CancelToken>,
    /// Token which wakes waiting participants.
    token: Arc<TurnToken>,
}

impl Stopper {
    /// Request every participant to stop.
    ///
    /// Participants exit without acting at their next suspension point.
    pub fn cancel(&self) {
        for cancel in self.cancels.iter() {
            cancel.cancel();
        }
        self.token.wake_all();
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Represents running game with thread per participant.
///
/// Game is [started][Game::start] from the roster and the initial token holder.
/// Wiring is validated before any thread is spawned.
/// After that user must [await completion][Game::await_completion],
/// which emits the completion notice to the sink exactly once.
pub struct Game<S: Sink + 'static> {
    /// Token shared with participant threads.
    token: Arc<TurnToken>,
    /// Cancel tokens of spawned participants.
    cancels: Vec<CancelToken>,
    /// Handles of spawned participant threads.
    handles: Vec<JoinHandle<()>>,
    /// Released when every participant thread exits.
    latch: CountdownLatch,
    /// Receives the completion notice.
    sink: SinkWrapper<S>,
    /// Time given to participants to stop after cancellation on timeout.
    grace: Duration,
}

impl<S: Sink + 'static> Game<S> {
    /// Validate wiring, grant the token to `initial` and spawn participant threads.
    pub fn start(
        roster: Roster,
        initial: ParticipantId,
        sink: SinkWrapper<S>,
        settings: RunSettings,
    ) -> GameResult<Self> {
        let wiring = roster.seal(initial)?;
        let token = Arc::new(TurnToken::new(&wiring, settings.poll_interval));
        token.grant(initial)?;

        let latch = CountdownLatch::new(wiring.participants.len());
        let mut game = Self {
            token,
            cancels: Vec::with_capacity(wiring.participants.len()),
            handles: Vec::with_capacity(wiring.participants.len()),
            latch,
            sink,
            grace: settings.grace,
        };

        for participant in wiring.participants {
            let cancel = CancelToken::new();
            let seat = Seat {
                token: game.token.clone(),
                sink: game.sink.clone(),
                cancel: cancel.clone(),
                turn_delay: settings.turn_delay,
                done: game.latch.guard(),
            };
            let spawned = thread::Builder::new()
                .name(participant.identity.clone())
                .spawn(move || runner::run(participant, seat));
            match spawned {
                Ok(handle) => {
                    game.cancels.push(cancel);
                    game.handles.push(handle);
                }
                Err(info) => {
                    game.cancel();
                    return Err(GameError::Spawn(info));
                }
            }
        }

        log::info!("game started with {} participants", game.handles.len());
        Ok(game)
    }

    /// Token of the game, allows to inspect it while the game runs.
    pub fn token(&self) -> &TurnToken {
        &self.token
    }

    /// Returns handle which can stop the game while it is awaited.
    pub fn stopper(&self) -> Stopper {
        Stopper {
            cancels: self.cancels.clone(),
            token: self.token.clone(),
        }
    }

    /// Request every participant to stop.
    ///
    /// Participants exit without acting at their next suspension point.
    pub fn cancel(&self) {
        self.stopper().cancel();
    }

    /// Block until every participant stops or the timeout elapses.
    ///
    /// On timeout participants are cancelled and given the grace period to stop.
    /// To stop the game earlier, cancel it through its [stopper][Game::stopper].
    pub fn await_completion(self, timeout: Duration) -> Outcome {
        let in_time = self.latch.wait_timeout(timeout);
        let stopped = if in_time {
            true
        } else {
            log::warn!("game did not complete in {:?}, cancelling", timeout);
            self.cancel();
            self.latch.wait_timeout(self.grace)
        };

        if stopped {
            for handle in self.handles {
                if handle.join().is_err() {
                    log::warn!("participant thread panicked");
                }
            }
        } else {
            log::warn!("participants did not stop in {:?}", self.grace);
        }

        let outcome = self.token.outcome(!in_time);
        self.sink.finish(&outcome);
        log::info!("game is over: {:?}", outcome);
        outcome
    }
}
