use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    GameError, Outcome, Phase, RecordingSink, Roster, RunSettings, Sink, SinkWrapper, TurnEvent,
};

use super::Game;

const TIMEOUT: Duration = Duration::from_secs(10);

fn settings() -> RunSettings {
    RunSettings {
        poll_interval: Duration::from_millis(10),
        turn_delay: Duration::ZERO,
        grace: Duration::from_secs(1),
    }
}

fn play(roster: Roster, initial: crate::ParticipantId) -> (Outcome, SinkWrapper<RecordingSink>) {
    let sink = SinkWrapper::new(RecordingSink::new());
    let game = Game::start(roster, initial, sink.clone(), settings()).unwrap();
    (game.await_completion(TIMEOUT), sink)
}

#[test]
fn ping_pong_three_turns() {
    let (roster, ping) = Roster::ping_pong(3);
    let (outcome, sink) = play(roster, ping);

    assert_eq!(outcome, Outcome::Completed { events: 6 });
    let sink = sink.read();
    assert_eq!(
        sink.identities(),
        vec!["ping", "pong", "ping", "pong", "ping", "pong"]
    );
    let seqs = sink.events().iter().map(|e| e.seq).collect::<Vec<_>>();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(sink.outcomes(), [Outcome::Completed { events: 6 }]);
}

#[test]
fn strict_alternation_for_any_budget() {
    for budget in 1..=16 {
        for first in ["ping", "pong"] {
            let (roster, _) = Roster::ping_pong(budget);
            let initial = roster.find(first).unwrap();
            let (outcome, sink) = play(roster, initial);

            assert_eq!(
                outcome,
                Outcome::Completed {
                    events: 2 * budget as u64
                }
            );
            let sink = sink.read();
            let identities = sink.identities();
            assert_eq!(identities.len(), 2 * budget as usize);
            assert_eq!(identities[0], first);
            for pair in identities.windows(2) {
                assert_ne!(pair[0], pair[1], "doubled turn with budget {}", budget);
            }
        }
    }
}

#[test]
fn zero_budget_completes_immediately() {
    let (roster, ping) = Roster::ping_pong(0);
    let started = Instant::now();
    let (outcome, sink) = play(roster, ping);

    assert_eq!(outcome, Outcome::Completed { events: 0 });
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(sink.read().events().is_empty());
    assert_eq!(sink.read().outcomes().len(), 1);
}

#[test]
fn missing_wiring_fails_before_start() {
    let mut roster = Roster::new();
    let ping = roster.create("ping", 3);
    roster.create("pong", 3);

    let sink = SinkWrapper::new(RecordingSink::new());
    match Game::start(roster, ping, sink.clone(), settings()) {
        Err(GameError::MissingWiring { participant }) => assert_eq!(participant, "ping"),
        Err(other) => panic!("expected missing wiring, got {:?}", other),
        Ok(_) => panic!("expected missing wiring"),
    }
    assert!(sink.read().events().is_empty());
    assert!(sink.read().outcomes().is_empty());
}

#[test]
fn three_participants_take_turns_in_ring() {
    let roster = Roster::ring(&[("a", 2), ("b", 2), ("c", 2)]).unwrap();
    let (outcome, sink) = play(roster, crate::ParticipantId(0));

    assert!(outcome.is_completed());
    assert_eq!(sink.read().identities(), vec!["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn reruns_are_deterministic() {
    let run = || {
        let (roster, ping) = Roster::ping_pong(25);
        let (outcome, sink) = play(roster, ping);
        let events = sink.read().events().to_vec();
        (outcome, events)
    };
    let (first_outcome, first_events) = run();
    for _ in 0..5 {
        let (outcome, events) = run();
        assert_eq!(outcome, first_outcome);
        assert_eq!(events, first_events);
    }
}

#[test]
fn cancel_stops_both_participants() {
    let (roster, ping) = Roster::ping_pong(1_000_000);
    let sink = SinkWrapper::new(RecordingSink::new());
    let mut run_settings = settings();
    run_settings.turn_delay = Duration::from_millis(1);
    let game = Game::start(roster, ping, sink.clone(), run_settings).unwrap();

    thread::sleep(Duration::from_millis(50));
    game.cancel();
    let seen = game.token().events();
    let started = Instant::now();
    let outcome = game.await_completion(TIMEOUT);

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(
        outcome,
        Outcome::Cancelled {
            events: seen,
            unfinished: vec!["ping".to_owned(), "pong".to_owned()]
        }
    );
    assert_eq!(sink.read().events().len() as u64, seen);
    assert_eq!(sink.read().outcomes().len(), 1);
}

#[test]
fn phases_are_terminal_after_cancel() {
    let (roster, ping) = Roster::ping_pong(1_000_000);
    let pong = roster.find("pong").unwrap();
    let sink = SinkWrapper::new(RecordingSink::new());
    let game = Game::start(roster, ping, sink, settings()).unwrap();

    thread::sleep(Duration::from_millis(20));
    game.cancel();
    let deadline = Instant::now() + Duration::from_secs(2);
    while !(game.token().phase(ping).is_terminal() && game.token().phase(pong).is_terminal()) {
        assert!(Instant::now() < deadline, "participants did not stop");
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(game.token().phase(ping), Phase::Cancelled);
    assert_eq!(game.token().phase(pong), Phase::Cancelled);
    assert!(!game.await_completion(TIMEOUT).is_completed());
}

#[test]
fn stopper_cancels_awaited_game() {
    let (roster, ping) = Roster::ping_pong(1_000_000);
    let sink = SinkWrapper::new(RecordingSink::new());
    let mut run_settings = settings();
    run_settings.turn_delay = Duration::from_millis(1);
    let game = Game::start(roster, ping, sink.clone(), run_settings).unwrap();

    let stopper = game.stopper();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        stopper.cancel();
    });
    let started = Instant::now();
    let outcome = game.await_completion(TIMEOUT);
    canceller.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    match &outcome {
        Outcome::Cancelled { events, unfinished } => {
            assert_eq!(sink.read().events().len() as u64, *events);
            assert_eq!(unfinished, &vec!["ping".to_owned(), "pong".to_owned()]);
        }
        other => panic!("expected cancelled game, got {:?}", other),
    }
    assert_eq!(sink.read().outcomes(), [outcome]);
}

#[test]
fn unequal_budgets_time_out() {
    let mut roster = Roster::new();
    let ping = roster.create("ping", 2);
    let pong = roster.create("pong", 3);
    roster.link(ping, pong).unwrap();
    roster.link(pong, ping).unwrap();

    let sink = SinkWrapper::new(RecordingSink::new());
    let game = Game::start(roster, ping, sink.clone(), settings()).unwrap();
    let outcome = game.await_completion(Duration::from_millis(200));

    assert_eq!(
        outcome,
        Outcome::TimedOut {
            events: 4,
            unfinished: vec!["pong".to_owned()]
        }
    );
    assert_eq!(sink.read().identities(), vec!["ping", "pong", "ping", "pong"]);
    assert_eq!(sink.read().outcomes(), [outcome]);
}

#[test]
fn token_has_single_holder() {
    let (roster, ping) = Roster::ping_pong(200);
    let sink = SinkWrapper::new(RecordingSink::new());
    let game = Arc::new(Game::start(roster, ping, sink, settings()).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let sampler = {
        let game = game.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut samples = 0;
            while !done.load(Ordering::SeqCst) {
                assert_eq!(game.token().holders(), 1);
                samples += 1;
            }
            samples
        })
    };

    while game.token().events() < 400 {
        thread::sleep(Duration::from_millis(1));
    }
    done.store(true, Ordering::SeqCst);
    assert!(sampler.join().unwrap() > 0);

    let game = Arc::try_unwrap(game).ok().unwrap();
    assert_eq!(game.await_completion(TIMEOUT), Outcome::Completed { events: 400 });
}

/// Checks that every turn is emitted by the thread of the acting participant.
#[derive(Default)]
struct OwnThreadSink {
    events: usize,
    foreign: Vec<TurnEvent>,
}

impl Sink for OwnThreadSink {
    fn on_turn(&mut self, event: &TurnEvent) {
        self.events += 1;
        if thread::current().name() != Some(event.identity.as_str()) {
            self.foreign.push(event.clone());
        }
    }

    fn on_finish(&mut self, _outcome: &Outcome) {}
}

#[test]
fn only_token_holder_acts() {
    let (roster, ping) = Roster::ping_pong(50);
    let sink = SinkWrapper::new(OwnThreadSink::default());
    let game = Game::start(roster, ping, sink.clone(), settings()).unwrap();

    assert!(game.await_completion(TIMEOUT).is_completed());
    assert_eq!(sink.read().events, 100);
    assert!(sink.read().foreign.is_empty());
}

/// Panics on the third turn, poisoning the coordination state.
struct PanickingSink;

impl Sink for PanickingSink {
    fn on_turn(&mut self, event: &TurnEvent) {
        if event.seq == 3 {
            panic!("sink failure");
        }
    }

    fn on_finish(&mut self, _outcome: &Outcome) {}
}

#[test]
fn panicked_peer_interrupts_wait() {
    let (roster, ping) = Roster::ping_pong(10);
    let game = Game::start(roster, ping, SinkWrapper::new(PanickingSink), settings()).unwrap();

    match game.await_completion(TIMEOUT) {
        Outcome::Cancelled { events, unfinished } => {
            assert_eq!(events, 2);
            assert_eq!(unfinished, vec!["ping", "pong"]);
        }
        other => panic!("expected cancelled game, got {:?}", other),
    }
}
