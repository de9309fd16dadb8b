//! Definition of [`Participant`] and its [`Phase`].

use std::fmt;

use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////

/// Identifies participant inside of its [roster][crate::Roster].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub(crate) usize);

impl ParticipantId {
    /// Position of the participant in the roster.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Represents possible phases of the participant during the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Participant is created, but not started yet.
    Idle,
    /// Participant waits for the token.
    WaitingForTurn,
    /// Participant holds the token and acts.
    Acting,
    /// Participant spent all of its turns.
    Finished,
    /// Participant left the game before spending all of its turns.
    Cancelled,
}

impl Phase {
    /// Allows to check whether the participant will not act any more.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished | Phase::Cancelled)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Represents wired participant of the game.
///
/// Participant is owned by the unit of execution it runs on.
/// Only that unit decrements [`remaining`][Participant::remaining],
/// and only while holding the token.
#[derive(Clone, Debug)]
pub struct Participant {
    /// Position in the roster.
    pub(crate) id: ParticipantId,
    /// Message emitted on every turn.
    pub(crate) identity: String,
    /// Turns at the start of the game.
    pub(crate) budget: u32,
    /// Turns left.
    pub(crate) remaining: u32,
    /// Successor, set once by the roster.
    pub(crate) next: ParticipantId,
}

impl Participant {
    /// Id of the participant.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Message the participant emits on its turn.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Number of turns the participant started with.
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Number of turns left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Number of turns already spent.
    pub(crate) fn spent(&self) -> u32 {
        self.budget - self.remaining
    }

    /// Successor which receives the token after this participant.
    pub fn next(&self) -> ParticipantId {
        self.next
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Represents result of waiting for the turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wait {
    /// Participant holds the token.
    Turn,
    /// Cancellation was requested while waiting.
    Cancelled,
}

/// Represents result of the handoff.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Handoff {
    /// Participant acted and the token was passed to the successor.
    Passed(ParticipantId),
    /// Cancellation was requested, participant did not act and kept the token.
    Cancelled,
}
