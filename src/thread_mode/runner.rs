//! Loop of the participant thread.

use std::{sync::Arc, thread, time::Duration};

use crate::common::{
    cancel::CancelToken,
    error::GameResult,
    participant::{Handoff, Participant, Phase, Wait},
    sink::{Sink, SinkWrapper},
};

use super::{latch::LatchGuard, token::TurnToken};

/// Everything the participant thread needs besides the participant itself.
pub(crate) struct Seat<S: Sink + 'static> {
    /// Token shared by all participants.
    pub token: Arc<TurnToken>,
    /// Receives the turns.
    pub sink: SinkWrapper<S>,
    /// Cancel token of this participant.
    pub cancel: CancelToken,
    /// Pause on the turn before acting.
    pub turn_delay: Duration,
    /// Counts the latch down when the thread exits.
    pub done: LatchGuard,
}

/// Run participant until its turns are spent or cancellation is requested.
pub(crate) fn run<S: Sink + 'static>(mut participant: Participant, seat: Seat<S>) {
    let phase = match play(&mut participant, &seat) {
        Ok(phase) => phase,
        Err(info) => {
            log::warn!("participant '{}' stops: {}", participant.identity, info);
            seat.cancel.cancel();
            Phase::Cancelled
        }
    };
    if phase == Phase::Cancelled {
        log::info!(
            "participant '{}' cancelled with {} turns left",
            participant.identity,
            participant.remaining
        );
    }
    seat.token.retire(participant.id, phase);
    drop(seat.done);
}

/// Take turns while there are any, returns the terminal phase.
fn play<S: Sink + 'static>(participant: &mut Participant, seat: &Seat<S>) -> GameResult<Phase> {
    while participant.remaining > 0 {
        if seat.token.await_turn(participant, &seat.cancel)? == Wait::Cancelled {
            return Ok(Phase::Cancelled);
        }
        if !seat.turn_delay.is_zero() {
            thread::sleep(seat.turn_delay);
        }
        let handoff = seat
            .token
            .consume_and_pass(participant, &seat.sink, &seat.cancel)?;
        if handoff == Handoff::Cancelled {
            return Ok(Phase::Cancelled);
        }
    }
    Ok(Phase::Finished)
}
