//! Game without concurrency: turns are taken by a plain loop.

use crate::common::{
    cancel::CancelToken,
    error::GameResult,
    outcome::Outcome,
    participant::{Handoff, ParticipantId, Phase},
    roster::Roster,
    sink::{Sink, SinkWrapper},
    table::Table,
};

/// Pass the token around the ring until it reaches participant without turns.
///
/// Produces the same turns as the concurrent games.
/// If the token stops while some participants still have turns,
/// the game is [stalled][Outcome::Stalled].
pub fn play<S: Sink + 'static>(
    roster: Roster,
    initial: ParticipantId,
    sink: SinkWrapper<S>,
) -> GameResult<Outcome> {
    let wiring = roster.seal(initial)?;
    let mut table = Table::new(&wiring);
    let mut participants = wiring.participants;
    for participant in participants.iter().filter(|p| p.remaining == 0) {
        table.set_phase(participant.id, Phase::Finished);
    }

    // Nobody can cancel a loop running on the caller thread.
    let never = CancelToken::new();
    table.grant(initial);
    let mut current = initial;
    while participants[current.0].remaining > 0 {
        table.set_phase(current, Phase::Acting);
        match table.consume_and_pass(&mut participants[current.0], &sink, &never)? {
            Handoff::Passed(next) => current = next,
            Handoff::Cancelled => break,
        }
    }

    let unfinished = table.unfinished();
    let outcome = if unfinished.is_empty() {
        Outcome::Completed {
            events: table.events(),
        }
    } else {
        Outcome::Stalled {
            events: table.events(),
            unfinished,
        }
    };
    sink.finish(&outcome);
    Ok(outcome)
}
