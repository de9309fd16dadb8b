//! Definition of trait [`Sink`] and struct [`SinkWrapper`].

use std::{
    io::{self, Write},
    ops::Deref,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde::{Deserialize, Serialize};

use super::outcome::{Outcome, TurnEvent};

/// Receives output of the game.
///
/// [`on_turn`][Sink::on_turn] is called exactly once per turn,
/// only by the token holder and inside of the handoff critical section.
/// [`on_finish`][Sink::on_finish] is called exactly once per game by the driver.
pub trait Sink: Send + Sync {
    /// Called when participant makes its turn.
    fn on_turn(&mut self, event: &TurnEvent);

    /// Called when game is over.
    fn on_finish(&mut self, outcome: &Outcome);
}

////////////////////////////////////////////////////////////////////////////////

/// Represents wrapper around user-defined sink,
/// which is shared between participants and the driver.
///
/// After the game is over user can get read access to the sink.
pub struct SinkWrapper<S: Sink + 'static> {
    /// Shared sink.
    pub(crate) sink_ref: Arc<RwLock<S>>,
}

impl<S: Sink + 'static> Clone for SinkWrapper<S> {
    fn clone(&self) -> Self {
        Self {
            sink_ref: self.sink_ref.clone(),
        }
    }
}

/// Represents guard for user-defined sink.
/// While user holds it, participants can not emit turns.
pub struct SinkGuard<'a, S: Sink + 'static> {
    /// Read lock of the shared sink.
    inner: RwLockReadGuard<'a, S>,
}

impl<S: Sink + 'static> Deref for SinkGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<S: Sink + 'static> SinkWrapper<S> {
    /// Wrap sink.
    pub fn new(sink: S) -> Self {
        Self {
            sink_ref: Arc::new(RwLock::new(sink)),
        }
    }

    /// Returns guard for read access to the sink.
    ///
    /// # Panics
    ///
    /// - If participant panicked while emitting turn. For more information see
    ///   [`std::sync::RwLock#poisoning`] documentation.
    pub fn read(&self) -> SinkGuard<'_, S> {
        let inner = self
            .sink_ref
            .read()
            .expect("Can not read sink, probably participant has been panicked");
        SinkGuard { inner }
    }

    /// Returns write access for participants, or `None` if sink is poisoned.
    pub(crate) fn write(&self) -> Option<RwLockWriteGuard<'_, S>> {
        self.sink_ref.write().ok()
    }

    /// Emit completion notice, even if some participant poisoned the sink.
    pub(crate) fn finish(&self, outcome: &Outcome) {
        let mut sink = self
            .sink_ref
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sink.on_finish(outcome);
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Specifies how [`ConsoleSink`] prints the game.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Identity per line, then a completion notice.
    #[default]
    Text,
    /// Json object per line.
    Json,
}

/// Prints turns and completion notice to stdout.
#[derive(Clone, Debug, Default)]
pub struct ConsoleSink {
    /// How lines are printed.
    format: ReportFormat,
}

impl ConsoleSink {
    /// Create console sink with specified format.
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Print line to stdout, log a warning if it fails.
    fn print(&self, line: String) {
        if let Err(info) = writeln!(io::stdout().lock(), "{}", line) {
            log::warn!("can not print to stdout: {}", info);
        }
    }

    /// Serialize value into one json line, or into an error object if it fails.
    fn json<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|info| {
            let error = serde_json::json!({ "error": info.to_string() });
            error.to_string()
        })
    }
}

impl Sink for ConsoleSink {
    fn on_turn(&mut self, event: &TurnEvent) {
        let line = match self.format {
            ReportFormat::Text => event.identity.clone(),
            ReportFormat::Json => Self::json(event),
        };
        self.print(line);
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        let line = match (self.format, outcome) {
            (ReportFormat::Json, _) => Self::json(outcome),
            (ReportFormat::Text, Outcome::Completed { events }) => {
                format!("finished after {} turns", events)
            }
            (ReportFormat::Text, Outcome::Cancelled { unfinished, .. }) => {
                format!("cancelled, not finished: {}", unfinished.join(", "))
            }
            (ReportFormat::Text, Outcome::TimedOut { unfinished, .. }) => {
                format!("timed out, not finished: {}", unfinished.join(", "))
            }
            (ReportFormat::Text, Outcome::Stalled { unfinished, .. }) => {
                format!("stalled, not finished: {}", unfinished.join(", "))
            }
        };
        self.print(line);
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Keeps turns and outcomes in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    /// Turns in emission order.
    events: Vec<TurnEvent>,
    /// Completion notices.
    outcomes: Vec<Outcome>,
}

impl RecordingSink {
    /// Create empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded turns in emission order.
    pub fn events(&self) -> &[TurnEvent] {
        &self.events
    }

    /// Identities of acting participants in emission order.
    pub fn identities(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.identity.as_str()).collect()
    }

    /// Recorded completion notices.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}

impl Sink for RecordingSink {
    fn on_turn(&mut self, event: &TurnEvent) {
        self.events.push(event.clone());
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        self.outcomes.push(outcome.clone());
    }
}

#[cfg(test)]
mod tests {
    use serde::{ser::Error, Serialize, Serializer};

    use super::ConsoleSink;

    /// Fails to serialize with a message which must be escaped in json.
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("bad \"quoted\" value\\"))
        }
    }

    #[test]
    fn json_error_is_escaped() {
        let line = ConsoleSink::json(&Unserializable);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["error"], "bad \"quoted\" value\\");
    }
}
