//! Definition of [`Game`] which runs every participant as tokio task.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
    time::timeout,
};

use crate::common::{
    cancel::CancelToken,
    config::RunSettings,
    error::{GameError, GameResult},
    outcome::Outcome,
    participant::ParticipantId,
    roster::{Roster, Wiring},
    sink::{Sink, SinkWrapper},
};

use super::{
    runner::{self, DoneGuard, Seat},
    token::TurnToken,
};

/// Stops the game from another task or thread, while its owner awaits completion.
#[derive(Clone)]
pub struct Stopper {
    /// Cancel tokens of the spawned participants.
    cancels: Vec<CancelToken>,
    /// Token which wakes waiting participants.
    token: Arc<TurnToken>,
}

impl Stopper {
    /// Request every participant to stop.
    pub fn cancel(&self) {
        for cancel in self.cancels.iter() {
            cancel.cancel();
        }
        self.token.wake_all();
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Represents running game with task per participant.
pub struct Game<S: Sink + 'static> {
    /// Token shared with participant tasks.
    token: Arc<TurnToken>,
    /// Cancel tokens of spawned participants.
    cancels: Vec<CancelToken>,
    /// Handles of spawned participant tasks.
    handles: Vec<JoinHandle<()>>,
    /// Receives ids of participants which exited.
    done: Receiver<ParticipantId>,
    /// Number of participants which did not exit yet.
    pending: usize,
    /// Receives the completion notice.
    sink: SinkWrapper<S>,
    /// Time given to participants to stop after cancellation on timeout.
    grace: Duration,
}

impl<S: Sink + 'static> Game<S> {
    /// Validate wiring, grant the token to `initial` and spawn participant tasks.
    ///
    /// # Panics
    ///
    /// - If called outside of tokio runtime.
    pub fn start(
        roster: Roster,
        initial: ParticipantId,
        sink: SinkWrapper<S>,
        settings: RunSettings,
    ) -> GameResult<Self> {
        let wiring = roster.seal(initial)?;
        Self::launch(wiring, sink, settings)
    }

    /// Grant the token to the initial holder and spawn participant tasks on the current runtime.
    fn launch(wiring: Wiring, sink: SinkWrapper<S>, settings: RunSettings) -> GameResult<Self> {
        let token = Arc::new(TurnToken::new(&wiring, settings.poll_interval));
        token.grant(wiring.initial)?;

        let count = wiring.participants.len();
        let (sender, done) = mpsc::channel(count);
        let mut cancels = Vec::with_capacity(count);
        let mut handles = Vec::with_capacity(count);
        for participant in wiring.participants {
            let cancel = CancelToken::new();
            let seat = Seat {
                token: token.clone(),
                sink: sink.clone(),
                cancel: cancel.clone(),
                turn_delay: settings.turn_delay,
                done: DoneGuard {
                    id: participant.id,
                    sender: sender.clone(),
                },
            };
            cancels.push(cancel);
            handles.push(tokio::spawn(runner::run(participant, seat)));
        }

        log::info!("game started with {} participant tasks", count);
        Ok(Self {
            token,
            cancels,
            handles,
            done,
            pending: count,
            sink,
            grace: settings.grace,
        })
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
    pub fn cancel(&self) {
        self.stopper().cancel();
    }

    /// Wait until every participant stops or the timeout elapses.
    ///
    /// On timeout participants are cancelled and given the grace period to stop.
    pub async fn await_completion(mut self, limit: Duration) -> Outcome {
        let in_time = self.collect(limit).await;
        let stopped = if in_time {
            true
        } else {
            log::warn!("game did not complete in {:?}, cancelling", limit);
            self.cancel();
            let grace = self.grace;
            self.collect(grace).await
        };

        for handle in self.handles {
            if !stopped {
                handle.abort();
            } else if let Err(info) = handle.await {
                log::warn!("participant task failed: {}", info);
            }
        }
        if !stopped {
            log::warn!("participants did not stop in {:?}", self.grace);
        }

        let outcome = self.token.outcome(!in_time);
        self.sink.finish(&outcome);
        log::info!("game is over: {:?}", outcome);
        outcome
    }

    /// Returns `true` if every participant reported exit in the given time.
    async fn collect(&mut self, limit: Duration) -> bool {
        let wait = async {
            while self.pending > 0 {
                match self.done.recv().await {
                    Some(_) => self.pending -= 1,
                    None => break,
                }
            }
        };
        let _ = timeout(limit, wait).await;
        self.pending == 0
    }
}

/// Run game on its own multi-thread runtime and block until it is over.
///
/// Wiring is validated before the runtime is created.
///
/// # Errors
///
/// - [`GameError::NestedRuntime`] if called from inside of tokio runtime,
///   where the game must be [started][Game::start] and
///   [awaited][Game::await_completion] instead.
pub fn run<S: Sink + 'static>(
    roster: Roster,
    initial: ParticipantId,
    sink: SinkWrapper<S>,
    settings: RunSettings,
    limit: Duration,
) -> GameResult<Outcome> {
    let wiring = roster.seal(initial)?;
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(GameError::NestedRuntime);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .map_err(GameError::Runtime)?;

    runtime.block_on(async move {
        let game = Game::launch(wiring, sink, settings)?;
        Ok(game.await_completion(limit).await)
    })
}
