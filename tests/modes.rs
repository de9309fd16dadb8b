use pingpong::{GameConfig, GameError, Mode, Outcome, PlayerConfig, RecordingSink, SinkWrapper};

fn config(mode: Mode, ping: u32, pong: u32) -> GameConfig {
    GameConfig {
        players: vec![
            PlayerConfig {
                name: "ping".to_owned(),
                turns: ping,
            },
            PlayerConfig {
                name: "pong".to_owned(),
                turns: pong,
            },
        ],
        mode,
        timeout_secs: 0.5,
        poll_interval_secs: 0.01,
        ..GameConfig::default()
    }
}

#[test]
fn every_mode_alternates() {
    for mode in [Mode::Thread, Mode::Async, Mode::Sequential] {
        let sink = SinkWrapper::new(RecordingSink::new());
        let outcome = pingpong::run(&config(mode, 3, 3), sink.clone()).unwrap();

        assert_eq!(outcome, Outcome::Completed { events: 6 }, "mode {:?}", mode);
        let sink = sink.read();
        assert_eq!(
            sink.identities(),
            vec!["ping", "pong", "ping", "pong", "ping", "pong"],
            "mode {:?}",
            mode
        );
        assert_eq!(sink.outcomes(), [outcome]);
    }
}

#[test]
fn every_mode_reports_unfinished() {
    for mode in [Mode::Thread, Mode::Async, Mode::Sequential] {
        let sink = SinkWrapper::new(RecordingSink::new());
        let outcome = pingpong::run(&config(mode, 2, 3), sink.clone()).unwrap();

        assert!(!outcome.is_completed(), "mode {:?}", mode);
        assert_eq!(outcome.events(), 4);
        assert_eq!(outcome.unfinished(), ["pong".to_owned()]);
        assert_eq!(sink.read().outcomes().len(), 1);
    }
}

#[test]
fn initial_holder_from_config() {
    let mut config = config(Mode::Thread, 2, 2);
    config.initial = Some("pong".to_owned());
    let sink = SinkWrapper::new(RecordingSink::new());

    pingpong::run(&config, sink.clone()).unwrap();
    assert_eq!(sink.read().identities(), vec!["pong", "ping", "pong", "ping"]);
}

#[test]
fn config_is_validated_before_running() {
    let mut config = config(Mode::Async, 1, 1);
    config.players[1].name = "ping".to_owned();
    let sink = SinkWrapper::new(RecordingSink::new());

    assert!(pingpong::run(&config, sink.clone()).is_err());
    assert!(sink.read().outcomes().is_empty());
}

#[tokio::test]
async fn async_mode_inside_runtime_is_an_error() {
    let sink = SinkWrapper::new(RecordingSink::new());
    let result = pingpong::run(&config(Mode::Async, 3, 3), sink.clone());

    assert!(matches!(result, Err(GameError::NestedRuntime)));
    assert!(sink.read().outcomes().is_empty());
}
