//! Definition of [`TurnToken`] for participants running as tokio tasks.

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{sync::Notify, time::timeout};

use crate::common::{
    cancel::CancelToken,
    error::{GameError, GameResult},
    outcome::Outcome,
    participant::{Handoff, Participant, ParticipantId, Phase, Wait},
    roster::Wiring,
    sink::{Sink, SinkWrapper},
    table::Table,
};

/// Represents the token which only one participant task holds at a time.
///
/// State is guarded by one [`Mutex`], which is never held across `.await`.
/// Every participant waits on its own [`Notify`].
/// Waiter registers on [`Notify`] before checking the flag,
/// and [`Notify::notify_one`] keeps a permit for absent waiter,
/// so no wake-up is lost.
pub struct TurnToken {
    /// Coordination state, the only critical section of the game.
    table: Mutex<Table>,
    /// Notification per participant, sent when it gets the token.
    turns: Vec<Notify>,
    /// Interval of liveness messages of waiting participants.
    poll_interval: Duration,
}

impl TurnToken {
    /// Create token for wired participants. Nobody holds it yet.
    pub fn new(wiring: &Wiring, poll_interval: Duration) -> Self {
        Self {
            table: Mutex::new(Table::new(wiring)),
            turns: wiring.participants.iter().map(|_| Notify::new()).collect(),
            poll_interval,
        }
    }

    /// Lock the table for the participant, poisoning becomes [`GameError::InterruptedWait`].
    fn lock(&self, identity: &str) -> GameResult<MutexGuard<'_, Table>> {
        self.table.lock().map_err(|_| GameError::InterruptedWait {
            participant: identity.to_owned(),
        })
    }

    /// Lock the table ignoring poisoning, so a panicked peer does not stop the driver.
    fn inspect(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Give the token to the participant and wake it.
    pub fn grant(&self, participant: ParticipantId) -> GameResult<()> {
        self.lock("driver")?.grant(participant);
        self.turns[participant.0].notify_one();
        Ok(())
    }

    /// Wait until participant holds the token or its cancellation is requested.
    pub async fn await_turn(
        &self,
        participant: &Participant,
        cancel: &CancelToken,
    ) -> GameResult<Wait> {
        let id = participant.id;
        self.lock(&participant.identity)?
            .set_phase(id, Phase::WaitingForTurn);
        loop {
            let notified = self.turns[id.0].notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut table = self.lock(&participant.identity)?;
                if cancel.is_cancelled() {
                    return Ok(Wait::Cancelled);
                }
                if table.holds(id) {
                    table.set_phase(id, Phase::Acting);
                    return Ok(Wait::Turn);
                }
            }
            if timeout(self.poll_interval, notified).await.is_err() {
                log::debug!("'{}' is still waiting for its turn", participant.identity);
            }
        }
    }

    /// Emit the turn, spend it and pass the token to the successor atomically.
    pub fn consume_and_pass<S: Sink + 'static>(
        &self,
        participant: &mut Participant,
        sink: &SinkWrapper<S>,
        cancel: &CancelToken,
    ) -> GameResult<Handoff> {
        let handoff = self
            .lock(&participant.identity)?
            .consume_and_pass(participant, sink, cancel)?;
        if let Handoff::Passed(next) = handoff {
            self.turns[next.0].notify_one();
        }
        Ok(handoff)
    }

    /// Mark participant as left the game.
    pub(crate) fn retire(&self, participant: ParticipantId, phase: Phase) {
        self.inspect().set_phase(participant, phase);
    }

    /// Wake every waiting participant, so they re-check cancellation.
    pub fn wake_all(&self) {
        let _table = self.inspect();
        for turn in self.turns.iter() {
            turn.notify_waiters();
        }
    }

    /// Number of participants holding the token.
    pub fn holders(&self) -> usize {
        self.inspect().holders()
    }

    /// Current phase of the participant.
    pub fn phase(&self, participant: ParticipantId) -> Phase {
        self.inspect().phase(participant)
    }

    /// Number of turns made.
    pub fn events(&self) -> u64 {
        self.inspect().events()
    }

    /// Outcome of the game from the current phases.
    pub(crate) fn outcome(&self, timed_out: bool) -> Outcome {
        self.inspect().outcome(timed_out)
    }
}
