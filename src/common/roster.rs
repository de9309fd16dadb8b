//! Construction and wiring of participants.

use super::{
    error::{GameError, GameResult},
    participant::{Participant, ParticipantId},
};

////////////////////////////////////////////////////////////////////////////////

/// Participant as it was created, before the wiring is checked.
#[derive(Clone, Debug)]
struct Entry {
    /// Message the participant emits.
    identity: String,
    /// Number of turns to make.
    budget: u32,
    /// Successor, if already linked.
    next: Option<ParticipantId>,
}

/// Collects participants and their links before the game starts.
///
/// Every participant must be [linked][Roster::link] to its successor.
/// Links must form exactly one cycle through all participants.
/// Wiring is checked by [`seal`][Roster::seal],
/// which every driver calls before launching anything.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    /// Created participants, indexed by [`ParticipantId`].
    entries: Vec<Entry>,
}

impl Roster {
    /// Create empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create roster of participants linked into ring in the listed order.
    pub fn ring(players: &[(&str, u32)]) -> GameResult<Self> {
        let mut roster = Self::new();
        let ids = players
            .iter()
            .map(|(identity, budget)| roster.create(*identity, *budget))
            .collect::<Vec<_>>();
        for (i, id) in ids.iter().enumerate() {
            roster.link(*id, ids[(i + 1) % ids.len()])?;
        }
        Ok(roster)
    }

    /// Create canonical "ping" and "pong" pair with equal budgets.
    ///
    /// Returns roster and id of "ping", which usually holds the initial token.
    pub fn ping_pong(budget: u32) -> (Self, ParticipantId) {
        let mut roster = Self::new();
        let ping = roster.create("ping", budget);
        let pong = roster.create("pong", budget);
        roster.entries[ping.0].next = Some(pong);
        roster.entries[pong.0].next = Some(ping);
        (roster, ping)
    }

    /// Add participant with specified identity and turn budget.
    pub fn create(&mut self, identity: impl Into<String>, budget: u32) -> ParticipantId {
        let id = ParticipantId(self.entries.len());
        self.entries.push(Entry {
            identity: identity.into(),
            budget,
            next: None,
        });
        id
    }

    /// Link participant to its successor.
    ///
    /// Link is set once and can not be changed after.
    pub fn link(&mut self, participant: ParticipantId, next: ParticipantId) -> GameResult<()> {
        self.entry(next)?;
        let entry = self
            .entries
            .get_mut(participant.0)
            .ok_or(GameError::UnknownParticipant { id: participant })?;
        if entry.next.is_some() {
            return Err(GameError::AlreadyLinked {
                participant: entry.identity.clone(),
            });
        }
        entry.next = Some(next);
        Ok(())
    }

    /// Returns number of participants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Allows to check whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns identity of the participant.
    pub fn identity(&self, participant: ParticipantId) -> GameResult<&str> {
        self.entry(participant).map(|entry| entry.identity.as_str())
    }

    /// Looks up participant by its identity.
    pub fn find(&self, identity: &str) -> Option<ParticipantId> {
        self.entries
            .iter()
            .position(|entry| entry.identity == identity)
            .map(ParticipantId)
    }

    /// Validate wiring and turn roster into participants ready to run.
    pub fn seal(self, initial: ParticipantId) -> GameResult<Wiring> {
        if self.entries.is_empty() {
            return Err(GameError::EmptyRoster);
        }
        self.entry(initial)?;

        let mut participants = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let next = entry.next.ok_or_else(|| GameError::MissingWiring {
                participant: entry.identity.clone(),
            })?;
            participants.push(Participant {
                id: ParticipantId(index),
                identity: entry.identity.clone(),
                budget: entry.budget,
                remaining: entry.budget,
                next,
            });
        }

        // Walking the links from the first participant must visit everyone once.
        let mut visited = vec![false; participants.len()];
        let mut current = ParticipantId(0);
        for _ in 0..participants.len() {
            if visited[current.0] {
                break;
            }
            visited[current.0] = true;
            current = participants[current.0].next;
        }
        if let Some(outside) = visited.iter().position(|seen| !seen) {
            return Err(GameError::BrokenCycle {
                participant: participants[outside].identity.clone(),
            });
        }
        if current != ParticipantId(0) {
            return Err(GameError::BrokenCycle {
                participant: participants[current.0].identity.clone(),
            });
        }

        Ok(Wiring {
            participants,
            initial,
        })
    }

    /// Returns entry or [`GameError::UnknownParticipant`].
    fn entry(&self, participant: ParticipantId) -> GameResult<&Entry> {
        self.entries
            .get(participant.0)
            .ok_or(GameError::UnknownParticipant { id: participant })
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Represents validated roster: participants wired into one cycle
/// with the designated initial token holder.
#[derive(Clone, Debug)]
pub struct Wiring {
    /// Participants in roster order, each linked to its successor.
    pub(crate) participants: Vec<Participant>,
    /// Initial token holder.
    pub(crate) initial: ParticipantId,
}

impl Wiring {
    /// Wired participants in roster order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Participant which holds the token when the game starts.
    pub fn initial(&self) -> ParticipantId {
        self.initial
    }

    /// Identities of all participants in roster order.
    pub fn identities(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|p| p.identity.clone())
            .collect()
    }
}
