mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use common::{RecordingGateway, at, message};
use snapshot_core::SnapshotError;
use snapshot_core::clock::{Clock, ManualClock};
use snapshot_core::commands::Commands;
use snapshot_core::compiler::NO_NOTE;
use snapshot_core::ingest::Ingestor;
use snapshot_core::prompts::MoodPrompts;
use snapshot_db::Database;
use snapshot_types::events::ReactionEvent;
use snapshot_types::models::{Mood, Theme};

struct Harness {
    db: Arc<Database>,
    clock: ManualClock,
    gateway: RecordingGateway,
    commands: Commands,
}

fn harness(mood_timeout: Duration) -> Harness {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let clock = ManualClock::new(at(19, 14, 0));
    let gateway = RecordingGateway::default();
    let commands = Commands::new(
        db.clone(),
        Arc::new(clock.clone()) as Arc<dyn Clock>,
        Arc::new(gateway.clone()),
        MoodPrompts::new(),
        mood_timeout,
    );
    Harness { db, clock, gateway, commands }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[tokio::test]
async fn mood_is_recorded_from_matching_reaction() {
    let h = harness(Duration::from_secs(5));

    let pending = {
        let commands = h.commands.clone();
        tokio::spawn(async move { commands.set_mood(4, 555).await })
    };
    while !h.commands.prompts().is_pending(4) {
        tokio::task::yield_now().await;
    }

    let reaction = ReactionEvent { user_id: 4, message_id: 555, emoji: "😴".into() };
    assert!(h.commands.prompts().resolve(&reaction));

    assert_eq!(pending.await.unwrap().unwrap(), Mood::Tired);
    assert_eq!(h.db.get_mood(4, today()).unwrap().as_deref(), Some("😴"));
}

#[tokio::test]
async fn mood_timeout_writes_nothing() {
    let h = harness(Duration::from_millis(20));

    let result = h.commands.set_mood(4, 555).await;

    assert!(matches!(result, Err(SnapshotError::Timeout)));
    assert_eq!(h.db.get_mood(4, today()).unwrap(), None);
}

#[tokio::test]
async fn theme_is_validated() {
    let h = harness(Duration::from_secs(1));

    assert_eq!(h.commands.set_theme(1, "NEON").await.unwrap(), Theme::Neon);
    assert_eq!(h.commands.get_theme(1).await.unwrap(), Theme::Neon);

    let err = h.commands.set_theme(1, "sepia").await.unwrap_err();
    assert!(matches!(err, SnapshotError::Validation(_)));
    assert_eq!(h.commands.get_theme(1).await.unwrap(), Theme::Neon);
}

#[tokio::test]
async fn note_requires_text_and_overwrites() {
    let h = harness(Duration::from_secs(1));

    assert!(matches!(
        h.commands.set_note(1, "   ").await,
        Err(SnapshotError::Validation(_))
    ));
    assert_eq!(h.db.get_note(1, today()).unwrap(), None);

    h.commands.set_note(1, "first draft").await.unwrap();
    h.commands.set_note(1, "  final answer ").await.unwrap();
    assert_eq!(h.db.get_note(1, today()).unwrap().as_deref(), Some("final answer"));
}

#[tokio::test]
async fn snapshot_now_for_idle_user() {
    let h = harness(Duration::from_secs(1));

    let snapshot = h.commands.snapshot_now(12).await.unwrap();

    assert_eq!(snapshot.messages_sent, 0);
    assert!(snapshot.top_words.is_empty());
    assert_eq!(snapshot.top_emoji, "none");
    assert_eq!(snapshot.mood, "none");
    assert_eq!(snapshot.note, NO_NOTE);
    assert_eq!(h.gateway.delivered_users(), vec![12]);
}

#[tokio::test]
async fn snapshot_now_reports_delivery_failure() {
    let h = harness(Duration::from_secs(1));
    h.gateway.fail_for(3);
    Ingestor::new(h.db.clone(), Arc::new(h.clock.clone()))
        .record(&message(3, "hello"))
        .unwrap();

    let err = h.commands.snapshot_now(3).await.unwrap_err();

    assert!(matches!(err, SnapshotError::Delivery(_)));
    assert!(h.gateway.deliveries().is_empty());
}

#[tokio::test]
async fn snapshot_now_uses_current_day() {
    let h = harness(Duration::from_secs(1));
    let ingestor = Ingestor::new(h.db.clone(), Arc::new(h.clock.clone()));

    ingestor.record(&message(5, "yesterday stuff")).unwrap();
    h.clock.advance(chrono::Duration::days(1));
    ingestor.record(&message(5, "today stuff")).unwrap();
    h.commands.set_theme(5, "dark").await.unwrap();

    let snapshot = h.commands.snapshot_now(5).await.unwrap();
    assert_eq!(snapshot.display_date, "20 October 2026");
    assert_eq!(snapshot.messages_sent, 1);
    assert_eq!(snapshot.top_words, vec!["today", "stuff"]);
    assert_eq!(snapshot.theme, Theme::Dark);
}
