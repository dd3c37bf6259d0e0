mod common;

use common::{config_for, joins, record, scheduler, wait_until, Script, ScriptedSource, StaticFeed};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use transferwatch::application::extract::CandidateExtractor;
use transferwatch::application::filter::TransferFilter;
use transferwatch::application::reliability::SourceReliabilityTable;
use transferwatch::application::scheduler::{ChangeDetection, SchedulerConfig, TransferScheduler};
use transferwatch::application::vocabulary::ClubVocabulary;
use transferwatch::domain::error::DomainError;
use transferwatch::domain::ports::listener::{TransferListener, TransferNotification};

const NEWS: &str = "https://www.bbc.co.uk/sport/football/transfers";
const CLUB: &str = "https://www.arsenal.com/news";
const BROKEN: &str = "https://broken.example/transfers";

fn three() -> String {
    joins(&[
        ("Jane Doe", "Arsenal"),
        ("John Roe", "Chelsea"),
        ("Max Power", "Everton"),
    ])
}

#[tokio::test]
async fn test_no_notification_without_increase() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &three()));
    let (scheduler, listener) = scheduler(source, config_for(&[NEWS]));

    let first = scheduler.trigger().await.unwrap();
    assert_eq!(first.qualifying.len(), 3);
    assert_eq!(first.new_count, 3);

    let second = scheduler.trigger().await.unwrap();
    assert_eq!(second.qualifying.len(), 3);
    assert_eq!(second.new_count, 0);
    assert!(second.notification.is_none());

    assert_eq!(listener.notifications().len(), 1);
    assert_eq!(scheduler.last_count().await, 3);
}

#[tokio::test]
async fn test_notification_on_increase_names_sources() {
    let source = Arc::new(
        ScriptedSource::new().fixed(NEWS, &three()).page(
            CLUB,
            vec![
                Script::Text("No transfer news today.".into()),
                Script::Text(joins(&[("Sam Stone", "Fulham"), ("Leo Park", "Burnley")])),
            ],
        ),
    );
    let (scheduler, listener) = scheduler(source, config_for(&[NEWS, CLUB]));

    scheduler.trigger().await.unwrap();
    let report = scheduler.trigger().await.unwrap();

    assert_eq!(report.qualifying.len(), 5);
    let notification = report.notification.expect("increase should notify");
    assert_eq!(notification.count, 2);
    assert_eq!(notification.sources, vec![CLUB.to_string()]);
    assert_eq!(notification.message, "2 new transfers detected");

    let received = listener.notifications();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1], notification);
}

#[tokio::test]
async fn test_new_keys_sees_replacements_count_only_does_not() {
    let scripts = vec![
        Script::Text(three()),
        Script::Text(joins(&[
            ("Jane Doe", "Arsenal"),
            ("John Roe", "Chelsea"),
            ("Leo Park", "Burnley"),
        ])),
    ];

    let source = Arc::new(ScriptedSource::new().page(NEWS, scripts.clone()));
    let (by_keys, _) = scheduler(source, config_for(&[NEWS]));
    by_keys.trigger().await.unwrap();
    let report = by_keys.trigger().await.unwrap();
    assert_eq!(report.new_count, 1);
    assert_eq!(report.notification.unwrap().count, 1);

    let source = Arc::new(ScriptedSource::new().page(NEWS, scripts));
    let config = SchedulerConfig {
        change_detection: ChangeDetection::CountOnly,
        ..config_for(&[NEWS])
    };
    let (by_count, _) = scheduler(source, config);
    by_count.trigger().await.unwrap();
    let report = by_count.trigger().await.unwrap();
    assert_eq!(report.new_count, 0);
    assert!(report.notification.is_none());
}

#[tokio::test]
async fn test_failed_url_is_isolated() {
    let source = Arc::new(
        ScriptedSource::new()
            .fixed(NEWS, &three())
            .page(BROKEN, vec![Script::Fail]),
    );
    let (scheduler, _) = scheduler(source, config_for(&[BROKEN, NEWS]));

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.failed_sources, vec![BROKEN.to_string()]);
    assert_eq!(report.sources, vec![NEWS.to_string()]);
}

#[tokio::test]
async fn test_slow_url_times_out() {
    let source = Arc::new(
        ScriptedSource::new().fixed(NEWS, &three()).page(
            CLUB,
            vec![Script::Slow(Duration::from_secs(30), joins(&[("Leo Park", "Burnley")]))],
        ),
    );
    let config = SchedulerConfig {
        fetch_timeout: Duration::from_millis(50),
        ..config_for(&[NEWS, CLUB])
    };
    let (scheduler, _) = scheduler(source, config);

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.qualifying.len(), 3);
    assert_eq!(report.failed_sources, vec![CLUB.to_string()]);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let urls: Vec<String> = (0..10)
        .map(|i| format!("https://site{i}.example/news"))
        .collect();
    let mut source = ScriptedSource::new();
    for url in &urls {
        source = source.page(
            url,
            vec![Script::Slow(Duration::from_millis(20), "nothing".into())],
        );
    }
    let source = Arc::new(source);
    let config = SchedulerConfig {
        urls: urls.clone(),
        max_concurrency: 3,
        ..Default::default()
    };
    let (scheduler, _) = scheduler(source.clone(), config);

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.sources.len(), 10);
    assert_eq!(source.total_calls(), 10);
    assert!(source.max_in_flight() <= 3);
}

#[tokio::test]
async fn test_earlier_url_wins_regardless_of_completion_order() {
    let slow_first = "https://www.skysports.com/transfers";
    let fast_second = "https://www.goal.com/en/transfers";
    let source = Arc::new(
        ScriptedSource::new()
            .page(
                slow_first,
                vec![Script::Slow(
                    Duration::from_millis(100),
                    joins(&[("Jane Doe", "Arsenal")]),
                )],
            )
            .fixed(fast_second, &joins(&[("Jane Doe", "Chelsea")])),
    );
    let (scheduler, _) = scheduler(source, config_for(&[slow_first, fast_second]));

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].to_club, "Arsenal");
    assert_eq!(report.records[0].source, slow_first);
    assert_eq!(report.records[0].source_score.value(), 90);
}

#[tokio::test]
async fn test_feed_records_merge_after_documents() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &joins(&[("Jane Doe", "Arsenal")])));
    let feed = Arc::new(StaticFeed::new(vec![
        record("jane doe", "Unknown", "Chelsea", "Undisclosed", 50),
        record("Leo Park", "Burnley", "Fulham", "8m", 50),
    ]));
    let scheduler = TransferScheduler::builder(
        source,
        Arc::new(CandidateExtractor::new(Arc::new(ClubVocabulary::premier_league()))),
        Arc::new(SourceReliabilityTable::default()),
    )
    .config(config_for(&[NEWS]))
    .feed(feed)
    .build();

    let report = scheduler.trigger().await.unwrap();
    let players: Vec<&str> = report.records.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(players, vec!["Jane Doe", "Leo Park"]);
    assert_eq!(report.records[0].to_club, "Arsenal");
    assert!(report.sources.contains(&"static".to_string()));
}

#[tokio::test]
async fn test_criteria_decide_what_qualifies() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &three()));
    let config = SchedulerConfig {
        criteria: TransferFilter {
            clubs: Some(vec!["Chelsea".into()]),
            ..Default::default()
        },
        ..config_for(&[NEWS])
    };
    let (scheduler, listener) = scheduler(source, config);

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.qualifying.len(), 1);
    assert_eq!(listener.notifications()[0].count, 1);
}

#[tokio::test]
async fn test_panicking_source_fails_alone() {
    let goal = "https://www.goal.com/en/transfers";
    let source = Arc::new(
        ScriptedSource::new()
            .fixed(NEWS, &joins(&[("Jane Doe", "Arsenal"), ("John Roe", "Chelsea")]))
            .page(goal, vec![Script::Panic]),
    );
    let (scheduler, listener) = scheduler(source, config_for(&[NEWS, goal]));

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.sources, vec![NEWS.to_string()]);
    assert_eq!(report.failed_sources, vec![goal.to_string()]);
    assert_eq!(listener.notifications()[0].count, 2);
    assert_eq!(scheduler.last_count().await, 2);
}

/// Panics on its first notification only.
#[derive(Default)]
struct PanicOnce {
    fired: AtomicBool,
}

impl TransferListener for PanicOnce {
    fn notify(&self, _notification: &TransferNotification) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            panic!("listener failed");
        }
    }
}

#[tokio::test]
async fn test_panicking_cycle_reports_error_and_recovers() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &three()));
    let (scheduler, listener) = scheduler(source, config_for(&[NEWS]));
    scheduler.add_listener(Arc::new(PanicOnce::default()));

    let err = scheduler.trigger().await.unwrap_err();
    assert!(matches!(err, DomainError::Cycle(_)));
    assert_eq!(scheduler.last_count().await, 0);
    assert!(scheduler.last_report().is_none());

    let report = scheduler.trigger().await.unwrap();
    assert_eq!(report.new_count, 3);
    assert_eq!(listener.notifications().len(), 2);
}

#[tokio::test]
async fn test_slow_feed_times_out_without_losing_pages() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &three()));
    let feed = Arc::new(
        StaticFeed::new(vec![record("Leo Park", "Burnley", "Fulham", "8m", 50)])
            .delayed(Duration::from_secs(30)),
    );
    let config = SchedulerConfig {
        fetch_timeout: Duration::from_millis(50),
        ..config_for(&[NEWS])
    };
    let scheduler = TransferScheduler::builder(
        source,
        Arc::new(CandidateExtractor::new(Arc::new(ClubVocabulary::premier_league()))),
        Arc::new(SourceReliabilityTable::default()),
    )
    .config(config)
    .feed(feed)
    .build();

    let report = tokio::time::timeout(Duration::from_secs(5), scheduler.trigger())
        .await
        .expect("feed should be cut off by the fetch timeout")
        .unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.sources, vec![NEWS.to_string()]);
    assert_eq!(report.failed_sources, vec!["static".to_string()]);
}

#[tokio::test]
async fn test_feeds_are_read_alongside_pages() {
    let source = Arc::new(ScriptedSource::new().page(
        NEWS,
        vec![Script::Slow(Duration::from_millis(300), three())],
    ));
    let feed = Arc::new(
        StaticFeed::new(vec![record("Leo Park", "Burnley", "Fulham", "8m", 50)])
            .delayed(Duration::from_millis(300)),
    );
    let scheduler = TransferScheduler::builder(
        source,
        Arc::new(CandidateExtractor::new(Arc::new(ClubVocabulary::premier_league()))),
        Arc::new(SourceReliabilityTable::default()),
    )
    .config(config_for(&[NEWS]))
    .feed(feed)
    .build();

    let started = Instant::now();
    let report = scheduler.trigger().await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(550));
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.sources, vec![NEWS.to_string(), "static".to_string()]);
}

#[tokio::test]
async fn test_empty_url_set_yields_empty_cycle() {
    let (scheduler, listener) = scheduler(Arc::new(ScriptedSource::new()), config_for(&[]));
    let report = scheduler.trigger().await.unwrap();
    assert!(report.records.is_empty());
    assert_eq!(report.new_count, 0);
    assert!(listener.notifications().is_empty());
}

#[tokio::test]
async fn test_start_runs_immediately_and_is_idempotent() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &three()));
    let (scheduler, listener) = scheduler(source.clone(), config_for(&[NEWS]));

    assert!(!scheduler.is_running());
    assert!(scheduler.start(Duration::from_secs(3600)));
    assert!(!scheduler.start(Duration::from_secs(3600)));
    assert!(scheduler.is_running());

    assert!(wait_until(|| scheduler.last_report().is_some()).await);
    assert_eq!(source.total_calls(), 1);
    assert_eq!(listener.notifications().len(), 1);

    assert!(scheduler.stop());
    assert!(!scheduler.is_running());
    assert!(!scheduler.stop());
}

#[tokio::test]
async fn test_stop_prevents_further_cycles() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &three()));
    let (scheduler, _) = scheduler(source.clone(), config_for(&[NEWS]));

    scheduler.start(Duration::from_millis(20));
    assert!(wait_until(|| source.total_calls() >= 2).await);
    scheduler.shutdown().await;

    let calls = source.total_calls();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(source.total_calls(), calls);
    assert!(!scheduler.is_running());

    assert!(scheduler.start(Duration::from_secs(3600)));
    assert!(wait_until(|| source.total_calls() > calls).await);
    scheduler.stop();
}

#[tokio::test]
async fn test_stop_mid_cycle_lets_it_finish_without_rearming() {
    let source = Arc::new(ScriptedSource::new().page(
        NEWS,
        vec![Script::Slow(Duration::from_millis(150), three())],
    ));
    let (scheduler, listener) = scheduler(source.clone(), config_for(&[NEWS]));

    scheduler.start(Duration::from_millis(20));
    assert!(wait_until(|| source.total_calls() == 1).await);
    assert!(scheduler.last_report().is_none());
    assert!(scheduler.stop());

    assert!(wait_until(|| scheduler.last_report().is_some()).await);
    assert_eq!(listener.notifications().len(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(source.total_calls(), 1);
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn test_huge_interval_is_clamped() {
    let source = Arc::new(ScriptedSource::new().fixed(NEWS, &three()));
    let (scheduler, _) = scheduler(source, config_for(&[NEWS]));

    assert!(scheduler.start(Duration::MAX));
    assert!(wait_until(|| scheduler.last_report().is_some()).await);
    assert!(scheduler.is_running());
    scheduler.shutdown().await;
}
