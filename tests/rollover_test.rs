mod helpers;

use cadence::db::migrations::get_last_rollover;
use cadence::habit::maintenance::rollover;
use cadence::habit::types::{Frequency, StreakCounters};
use cadence::habit::{store, streak};
use helpers::{date, test_db, test_service};

#[tokio::test]
async fn lapsed_daily_streak_is_reset_at_rollover() {
    let (service, clock) = test_service(date(2025, 1, 10));
    let habit = service
        .create_habit("alice", "Read", Frequency::Daily)
        .await
        .unwrap();
    service.check_in(&habit.id, "alice", None).await.unwrap();
    clock.set_day(date(2025, 1, 11));
    service.check_in(&habit.id, "alice", None).await.unwrap();

    // The 12th: yesterday was checked in, nothing to do.
    clock.set_day(date(2025, 1, 12));
    assert_eq!(service.rollover().await.unwrap().reset, 0);
    let status = service.get_habit(&habit.id, "alice").await.unwrap();
    assert_eq!(status.habit.counters(), StreakCounters { current: 2, longest: 2 });

    // The 13th: the 12th was skipped, the cached streak is stale.
    clock.set_day(date(2025, 1, 13));
    let result = service.rollover().await.unwrap();
    assert_eq!(result.reset, 1);
    assert_eq!(result.date, date(2025, 1, 13));
    let status = service.get_habit(&habit.id, "alice").await.unwrap();
    assert_eq!(status.habit.counters(), StreakCounters { current: 0, longest: 2 });

    // Next check-in starts over.
    service.check_in(&habit.id, "alice", None).await.unwrap();
    let status = service.get_habit(&habit.id, "alice").await.unwrap();
    assert_eq!(status.habit.counters(), StreakCounters { current: 1, longest: 2 });
}

#[tokio::test]
async fn analytics_reflect_rollover() {
    let (service, clock) = test_service(date(2025, 1, 10));
    let habit = service
        .create_habit("alice", "Read", Frequency::Daily)
        .await
        .unwrap();
    service.check_in(&habit.id, "alice", None).await.unwrap();

    let stats = service.stats(Some("alice")).await.unwrap();
    assert_eq!(stats.completed_today, 1);
    assert_eq!(stats.longest_streak, 1);

    clock.set_day(date(2025, 1, 20));
    service.rollover().await.unwrap();
    let stats = service.stats(Some("alice")).await.unwrap();
    assert_eq!(stats.completed_today, 0);
    assert_eq!(stats.longest_streak, 1);
    assert_eq!(stats.total_check_ins, 1);
}

#[test]
fn rollover_records_its_date() {
    let mut conn = test_db();
    assert!(get_last_rollover(&conn).unwrap().is_none());
    rollover(&mut conn, date(2025, 1, 10)).unwrap();
    rollover(&mut conn, date(2025, 1, 11)).unwrap();
    assert_eq!(get_last_rollover(&conn).unwrap(), Some(date(2025, 1, 11)));
}

#[test]
fn rollover_leaves_other_owners_and_live_habits_alone() {
    let mut conn = test_db();
    let alice = store::create(&conn, "alice", "Read", Frequency::Daily).unwrap();
    let bob = store::create(&conn, "bob", "Read", Frequency::Daily).unwrap();
    streak::check_in(&mut conn, &alice.id, "alice", date(2025, 1, 1), None).unwrap();
    streak::check_in(&mut conn, &bob.id, "bob", date(2025, 1, 9), None).unwrap();

    let result = rollover(&mut conn, date(2025, 1, 10)).unwrap();
    assert_eq!(result.reset, 1);
    assert_eq!(store::get(&conn, &alice.id).unwrap().unwrap().current_streak, 0);
    assert_eq!(store::get(&conn, &bob.id).unwrap().unwrap().current_streak, 1);
}

#[test]
fn stale_classification_matches_rollover() {
    let mut conn = test_db();
    let habit = store::create(&conn, "alice", "Read", Frequency::Weekly).unwrap();
    streak::check_in(&mut conn, &habit.id, "alice", date(2025, 1, 6), None).unwrap();

    let stored = store::get(&conn, &habit.id).unwrap().unwrap();
    let today = date(2025, 1, 20);
    let state = streak::live_state(&conn, &stored, today).unwrap();
    assert_eq!(state, cadence::habit::types::StreakState::Stale(1));

    assert_eq!(rollover(&mut conn, today).unwrap().reset, 1);
}
