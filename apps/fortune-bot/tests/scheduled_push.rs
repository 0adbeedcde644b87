use std::sync::Arc;
use std::time::Duration;

use fortune_bot::{AppState, FortuneSettings, PushOutcome, run_scheduled_push};
use fortune_core::{CalendarDate, FixedClock, Timezone};
use fortune_notifier::InMemoryNotifier;
use futures::future::join_all;

const POLLERS: usize = 16;

fn state_at_send_hour(notifier: &InMemoryNotifier) -> AppState {
    let date = CalendarDate::from_ymd(2024, 3, 15).unwrap();
    let now = Timezone::default().at_local(date, 8, 0).unwrap();
    AppState::with_defaults(
        Arc::new(notifier.clone()),
        Arc::new(FixedClock::new(now)),
        FortuneSettings::new("Udefault"),
    )
}

async fn poll_concurrently(state: &AppState) -> Vec<PushOutcome> {
    let handles = (0..POLLERS).map(|_| {
        let state = state.clone();
        tokio::spawn(async move { run_scheduled_push(&state).await })
    });
    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("poller task panicked"))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_polls_push_once() {
    let notifier = InMemoryNotifier::new().with_latency(Duration::from_millis(50));
    let state = state_at_send_hour(&notifier);

    let outcomes = poll_concurrently(&state).await;

    let sent = outcomes
        .iter()
        .filter(|o| matches!(o, PushOutcome::Sent(_)))
        .count();
    let not_due = outcomes
        .iter()
        .filter(|o| matches!(o, PushOutcome::NotDue))
        .count();
    assert_eq!(sent, 1);
    assert_eq!(not_due, POLLERS - 1);
    assert_eq!(notifier.attempts(), 1);
    assert_eq!(notifier.deliveries().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_polls_retry_after_failures() {
    let notifier = InMemoryNotifier::new().with_latency(Duration::from_millis(5));
    notifier.set_failing(true);
    let state = state_at_send_hour(&notifier);

    let outcomes = poll_concurrently(&state).await;

    assert!(outcomes.iter().all(|o| matches!(o, PushOutcome::Failed(_))));
    assert_eq!(notifier.attempts(), POLLERS);
    assert_eq!(state.gate.last_sent().await, None);

    notifier.set_failing(false);
    assert!(matches!(run_scheduled_push(&state).await, PushOutcome::Sent(_)));
    assert!(matches!(run_scheduled_push(&state).await, PushOutcome::NotDue));
}
