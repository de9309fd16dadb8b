//! Definition of [`GameConfig`] and [`RunSettings`].

use std::{collections::HashSet, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use super::{
    error::{GameError, GameResult},
    participant::ParticipantId,
    roster::Roster,
    sink::ReportFormat,
};

////////////////////////////////////////////////////////////////////////////////

/// Specifies how participants are executed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Thread per participant.
    #[default]
    Thread,
    /// Tokio task per participant.
    Async,
    /// Plain loop without concurrency.
    Sequential,
}

/// Represents one participant in the config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Identity of the participant.
    pub name: String,
    /// Turn budget of the participant.
    pub turns: u32,
}

/// Represents config of the game, read from json file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Participants, linked into ring in the listed order.
    pub players: Vec<PlayerConfig>,
    /// Initial token holder, the first player if not set.
    pub initial: Option<String>,
    /// Execution mode.
    pub mode: Mode,
    /// Time the driver waits for completion (in seconds).
    pub timeout_secs: f64,
    /// Interval of liveness messages of waiting participants (in seconds).
    pub poll_interval_secs: f64,
    /// Pause of the participant on its turn before acting (in seconds).
    pub turn_delay_secs: f64,
    /// Time given to participants to stop after cancellation (in seconds).
    pub grace_secs: f64,
    /// Output format of the console.
    pub format: ReportFormat,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: vec![
                PlayerConfig {
                    name: "ping".to_owned(),
                    turns: Self::DEFAULT_TURNS,
                },
                PlayerConfig {
                    name: "pong".to_owned(),
                    turns: Self::DEFAULT_TURNS,
                },
            ],
            initial: None,
            mode: Mode::default(),
            timeout_secs: 30.0,
            poll_interval_secs: 1.0,
            turn_delay_secs: 0.0,
            grace_secs: 1.0,
            format: ReportFormat::default(),
        }
    }
}

impl GameConfig {
    /// Turn budget of default players.
    pub const DEFAULT_TURNS: u32 = 10;

    /// Read and validate config from json file.
    pub fn from_file(filename: impl AsRef<Path>) -> GameResult<Self> {
        let file = std::fs::File::open(filename)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from json string.
    pub fn from_json(json: &str) -> GameResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check config values.
    pub fn validate(&self) -> GameResult<()> {
        if self.players.is_empty() {
            return Err(GameError::InvalidConfig("no players".to_owned()));
        }
        let mut names = HashSet::new();
        for player in self.players.iter() {
            if player.name.is_empty() {
                return Err(GameError::InvalidConfig("empty player name".to_owned()));
            }
            if !names.insert(player.name.as_str()) {
                return Err(GameError::InvalidConfig(format!(
                    "duplicate player '{}'",
                    player.name
                )));
            }
        }
        if let Some(initial) = &self.initial {
            if !names.contains(initial.as_str()) {
                return Err(GameError::InvalidConfig(format!(
                    "initial player '{}' is not listed",
                    initial
                )));
            }
        }
        check_secs("timeout_secs", self.timeout_secs, false)?;
        check_secs("poll_interval_secs", self.poll_interval_secs, false)?;
        check_secs("turn_delay_secs", self.turn_delay_secs, true)?;
        check_secs("grace_secs", self.grace_secs, true)?;
        Ok(())
    }

    /// Build ring of players and find the initial token holder.
    pub fn roster(&self) -> GameResult<(Roster, ParticipantId)> {
        let players = self
            .players
            .iter()
            .map(|p| (p.name.as_str(), p.turns))
            .collect::<Vec<_>>();
        let roster = Roster::ring(&players)?;
        let initial = match &self.initial {
            Some(name) => roster.find(name).ok_or_else(|| {
                GameError::InvalidConfig(format!("initial player '{}' is not listed", name))
            })?,
            None => ParticipantId(0),
        };
        Ok((roster, initial))
    }

    /// Time the driver waits for completion.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Settings of participant loops and the driver.
    pub fn settings(&self) -> RunSettings {
        RunSettings {
            poll_interval: Duration::from_secs_f64(self.poll_interval_secs),
            turn_delay: Duration::from_secs_f64(self.turn_delay_secs),
            grace: Duration::from_secs_f64(self.grace_secs),
        }
    }
}

/// Check that duration in seconds is finite, positive and not absurdly large.
///
/// Zero is accepted only if `zero_allowed`.
fn check_secs(name: &str, value: f64, zero_allowed: bool) -> GameResult<()> {
    let valid = value.is_finite() && (value > 0.0 || (zero_allowed && value == 0.0));
    if valid && value < 1e9 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!(
            "'{}' has invalid value {}",
            name, value
        )))
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Timing settings of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSettings {
    /// Waiting participant logs liveness message every interval.
    pub poll_interval: Duration,
    /// Participant pauses on its turn before acting.
    pub turn_delay: Duration,
    /// Time given to participants to stop after cancellation on timeout.
    pub grace: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            turn_delay: Duration::ZERO,
            grace: Duration::from_secs(1),
        }
    }
}
