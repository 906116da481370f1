//! End-to-end smoke test: a replay feed through the assembled pipeline.

use std::io::Write;

use alerting::lifecycle::{EpisodeState, StopTrigger};
use alerting::platform::sim::PlatformCall;
use dispatch_gateway::{DispatchService, GatewayConfig};

fn feed_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create feed file");
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_replay_feed_end_to_end() {
    let feed = feed_file(&[
        r#"{"type":"info","title":"shift brief"}"#,
        r#"{"type":"case","case_id":"c7"}"#,
        "this line is not json",
        r#"{"type":"new_case","priority":"critical","case_id":"c1","patient_name":"J. Doe"}"#,
    ]);

    let service = DispatchService::new(GatewayConfig::default());
    let file = tokio::fs::File::open(feed.path()).await.unwrap();
    service.run(tokio::io::BufReader::new(file)).await.unwrap();

    // The emergency episode rang and was shut down when the feed drained.
    assert_eq!(service.controller().state().await, EpisodeState::Idle);
    let transitions = service.controller().transitions();
    assert!(transitions
        .iter()
        .any(|t| t.trigger == Some(StopTrigger::Shutdown)));

    // Every acquired resource was released exactly once.
    let platform = service.platform();
    assert_eq!(
        platform.count_calls(|c| matches!(c, PlatformCall::SinkStopped { .. })),
        1
    );
    assert_eq!(
        platform.count_calls(|c| *c == PlatformCall::VibrationCancelled),
        1
    );
    assert_eq!(platform.count_calls(|c| *c == PlatformCall::WakeReleased), 1);

    // The event history shows the classification of all three valid messages
    // and exactly one started episode.
    let history = service.events().history();
    let classified = history
        .iter()
        .filter(|e| e.event_type() == "message_classified")
        .count();
    assert_eq!(classified, 3);
    let started = history
        .iter()
        .filter(|e| e.event_type() == "episode_started")
        .count();
    assert_eq!(started, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_config_file_shapes_the_episode() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "[alerting.alarm]\nmax_duration_secs = 5\nwake_grace_secs = 2\nrender_join_timeout_ms = 500"
    )
    .unwrap();
    config_file.flush().unwrap();

    let config = GatewayConfig::load(Some(config_file.path())).unwrap();
    assert_eq!(config.alerting.alarm.max_duration_secs, 5);

    let service = DispatchService::new(config);
    service
        .handle_line(r#"{"type":"emergency","case_id":"c1"}"#)
        .await
        .unwrap();

    // The wake assertion bound follows the configured window plus grace.
    let platform = service.platform();
    assert_eq!(
        platform.count_calls(|c| matches!(
            c,
            PlatformCall::WakeAcquired { bound } if *bound == std::time::Duration::from_secs(7)
        )),
        1
    );

    service.controller().shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_surface_follows_latest_emergency_in_feed() {
    let feed = feed_file(&[
        r#"{"type":"new_case","case_id":"c1","case_number":"n1"}"#,
        r#"{"type":"new_case","case_id":"c2","case_number":"n2"}"#,
    ]);

    let service = DispatchService::new(GatewayConfig::default());
    let file = tokio::fs::File::open(feed.path()).await.unwrap();
    service.run(tokio::io::BufReader::new(file)).await.unwrap();

    // The presentation left standing is the second case's.
    let details = service.surface().current_details().await.unwrap();
    assert_eq!(details.case_number, "n2");

    // Two episodes existed in sequence, never in parallel: the first was
    // superseded, the second shut down with the feed.
    let transitions = service.controller().transitions();
    assert_eq!(
        transitions
            .iter()
            .filter(|t| t.trigger == Some(StopTrigger::Superseded))
            .count(),
        1
    );
    assert_eq!(service.controller().state().await, EpisodeState::Idle);
}
