//! Loop of the participant task.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc::Sender;

use crate::common::{
    cancel::CancelToken,
    error::GameResult,
    participant::{Handoff, Participant, ParticipantId, Phase, Wait},
    sink::{Sink, SinkWrapper},
};

use super::token::TurnToken;

/// Reports participant exit to the driver when dropped,
/// also when the task panics or is aborted.
pub(crate) struct DoneGuard {
    /// Participant which reports its exit.
    pub id: ParticipantId,
    /// Channel read by the driver.
    pub sender: Sender<ParticipantId>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let _ = self.sender.try_send(self.id);
    }
}

/// Everything the participant task needs besides the participant itself.
pub(crate) struct Seat<S: Sink + 'static> {
    /// Token shared by all participants.
    pub token: Arc<TurnToken>,
    /// Receives the turns.
    pub sink: SinkWrapper<S>,
    /// Cancel token of this participant.
    pub cancel: CancelToken,
    /// Pause on the turn before acting.
    pub turn_delay: Duration,
    /// Reports the exit when the task ends.
    pub done: DoneGuard,
}

/// Run participant until its turns are spent or cancellation is requested.
pub(crate) async fn run<S: Sink + 'static>(mut participant: Participant, seat: Seat<S>) {
    let phase = match play(&mut participant, &seat).await {
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
async fn play<S: Sink + 'static>(
    participant: &mut Participant,
    seat: &Seat<S>,
) -> GameResult<Phase> {
    while participant.remaining > 0 {
        if seat.token.await_turn(participant, &seat.cancel).await? == Wait::Cancelled {
            return Ok(Phase::Cancelled);
        }
        if !seat.turn_delay.is_zero() {
            tokio::time::sleep(seat.turn_delay).await;
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
