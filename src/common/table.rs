//! Coordination state shared by the turn tokens of every mode.

use super::{
    cancel::CancelToken,
    error::{GameError, GameResult},
    outcome::{Outcome, TurnEvent},
    participant::{Handoff, Participant, ParticipantId, Phase},
    roster::Wiring,
    sink::{Sink, SinkWrapper},
};

/// Coordination state of one participant.
#[derive(Clone, Debug)]
struct Seat {
    /// Identity of the participant, for reports.
    identity: String,
    /// Set while the participant holds the token.
    holds_token: bool,
    /// Current phase of the participant.
    phase: Phase,
}

/// Seats of all participants and the number of turns made.
///
/// Table is always accessed under the single lock of the owning token.
/// At most one seat holds the token.
#[derive(Clone, Debug)]
pub(crate) struct Table {
    /// Seat per participant, indexed by [`ParticipantId`].
    seats: Vec<Seat>,
    /// Number of turns made.
    events: u64,
}

impl Table {
    /// Create table of idle seats. Nobody holds the token.
    pub fn new(wiring: &Wiring) -> Self {
        let seats = wiring
            .participants
            .iter()
            .map(|p| Seat {
                identity: p.identity.clone(),
                holds_token: false,
                phase: Phase::Idle,
            })
            .collect();
        Self { seats, events: 0 }
    }

    /// Number of seats holding the token.
    pub fn holders(&self) -> usize {
        self.seats.iter().filter(|seat| seat.holds_token).count()
    }

    /// Allows to check whether the participant holds the token.
    pub fn holds(&self, participant: ParticipantId) -> bool {
        self.seats[participant.0].holds_token
    }

    /// Number of turns made.
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Current phase of the participant.
    pub fn phase(&self, participant: ParticipantId) -> Phase {
        self.seats[participant.0].phase
    }

    /// Identity of the participant.
    pub fn identity(&self, participant: ParticipantId) -> &str {
        &self.seats[participant.0].identity
    }

    /// Move the participant to the phase.
    pub fn set_phase(&mut self, participant: ParticipantId, phase: Phase) {
        self.seats[participant.0].phase = phase;
    }

    /// Give the token to the participant.
    pub fn grant(&mut self, participant: ParticipantId) {
        self.seats[participant.0].holds_token = true;
        debug_assert!(self.holders() <= 1, "token granted twice");
    }

    /// Emit the turn, spend one turn and pass the token to the successor.
    ///
    /// Does nothing if cancellation is requested.
    /// On success returns the successor which must be woken.
    pub fn consume_and_pass<S: Sink + 'static>(
        &mut self,
        participant: &mut Participant,
        sink: &SinkWrapper<S>,
        cancel: &CancelToken,
    ) -> GameResult<Handoff> {
        let id = participant.id;
        if cancel.is_cancelled() {
            return Ok(Handoff::Cancelled);
        }
        if !self.holds(id) {
            return Err(GameError::NotTokenHolder {
                participant: participant.identity.clone(),
            });
        }
        if participant.remaining == 0 {
            return Err(GameError::NoTurnsLeft {
                participant: participant.identity.clone(),
            });
        }
        debug_assert_eq!(self.holders(), 1);

        let event = TurnEvent {
            seq: self.events + 1,
            identity: participant.identity.clone(),
            turn: participant.spent() + 1,
        };
        sink.write()
            .ok_or_else(|| GameError::InterruptedWait {
                participant: participant.identity.clone(),
            })?
            .on_turn(&event);
        self.events = event.seq;
        participant.remaining -= 1;

        let seat = &mut self.seats[id.0];
        seat.holds_token = false;
        seat.phase = if participant.remaining > 0 {
            Phase::WaitingForTurn
        } else {
            Phase::Finished
        };
        self.grant(participant.next);

        log::debug!(
            "turn {}: '{}' passed the token to '{}'",
            event.seq,
            participant.identity,
            self.identity(participant.next)
        );
        Ok(Handoff::Passed(participant.next))
    }

    /// Identities of participants which are not finished.
    pub fn unfinished(&self) -> Vec<String> {
        self.seats
            .iter()
            .filter(|seat| seat.phase != Phase::Finished)
            .map(|seat| seat.identity.clone())
            .collect()
    }

    /// Outcome of the game after every participant stopped or the timeout elapsed.
    pub fn outcome(&self, timed_out: bool) -> Outcome {
        let unfinished = self.unfinished();
        if unfinished.is_empty() {
            Outcome::Completed {
                events: self.events,
            }
        } else if timed_out {
            Outcome::TimedOut {
                events: self.events,
                unfinished,
            }
        } else {
            Outcome::Cancelled {
                events: self.events,
                unfinished,
            }
        }
    }
}
