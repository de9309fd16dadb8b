//! Definition of [`TurnToken`] for participants running on threads.

use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::common::{
    cancel::CancelToken,
    error::{GameError, GameResult},
    outcome::Outcome,
    participant::{Handoff, Participant, ParticipantId, Phase, Wait},
    roster::Wiring,
    sink::{Sink, SinkWrapper},
    table::Table,
};

/// Represents the token which only one participant holds at a time.
///
/// All coordination state lives in one [`Mutex`].
/// Every participant waits on its own [`Condvar`] bound to that mutex,
/// and the wait is always guarded by the re-checked "holds token" flag,
/// so neither a notification sent before the wait
/// nor a spurious wake-up breaks the alternation.
pub struct TurnToken {
    /// Coordination state, the only critical section of the game.
    table: Mutex<Table>,
    /// Condition per participant, signalled when it gets the token.
    turns: Vec<Condvar>,
    /// Interval of liveness messages of waiting participants.
    poll_interval: Duration,
}

impl TurnToken {
    /// Create token for wired participants. Nobody holds it yet.
    ///
    /// Waiting participants log liveness message every `poll_interval`.
    pub fn new(wiring: &Wiring, poll_interval: Duration) -> Self {
        Self {
            table: Mutex::new(Table::new(wiring)),
            turns: wiring.participants.iter().map(|_| Condvar::new()).collect(),
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
        let mut table = self.lock("driver")?;
        table.grant(participant);
        self.turns[participant.0].notify_one();
        Ok(())
    }

    /// Block until participant holds the token or its cancellation is requested.
    pub fn await_turn(&self, participant: &Participant, cancel: &CancelToken) -> GameResult<Wait> {
        let id = participant.id;
        let mut table = self.lock(&participant.identity)?;
        table.set_phase(id, Phase::WaitingForTurn);
        loop {
            if cancel.is_cancelled() {
                return Ok(Wait::Cancelled);
            }
            if table.holds(id) {
                table.set_phase(id, Phase::Acting);
                return Ok(Wait::Turn);
            }
            let (guard, result) = self.turns[id.0]
                .wait_timeout(table, self.poll_interval)
                .map_err(|_| GameError::InterruptedWait {
                    participant: participant.identity.clone(),
                })?;
            table = guard;
            if result.timed_out() {
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
        let mut table = self.lock(&participant.identity)?;
        let handoff = table.consume_and_pass(participant, sink, cancel)?;
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
            turn.notify_all();
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
