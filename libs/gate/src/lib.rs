//! Once-per-day delivery gate.
//!
//! The scheduled push is driven by an external poller that may call in many
//! times per minute. The gate turns those calls into at most one successful
//! delivery per local calendar day by remembering the last day a push went
//! out. The marker lives for the process lifetime only; after a restart the
//! first poll inside the send hour delivers again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fortune_core::{CalendarDate, Timezone};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument};

/// Local hour during which the daily push is due.
pub const DEFAULT_SEND_HOUR: u32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryGateState {
    pub last_sent: Option<CalendarDate>,
}

impl DeliveryGateState {
    fn is_due(&self, date: CalendarDate, hour: u32, send_hour: u32) -> bool {
        hour == send_hour && self.last_sent != Some(date)
    }
}

/// Shared handle to the gate; clones observe the same state.
#[derive(Clone, Debug)]
pub struct DeliveryGate {
    timezone: Timezone,
    send_hour: u32,
    state: Arc<Mutex<DeliveryGateState>>,
}

impl DeliveryGate {
    pub fn new(timezone: Timezone, send_hour: u32) -> Self {
        Self {
            timezone,
            send_hour,
            state: Arc::new(Mutex::new(DeliveryGateState::default())),
        }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn send_hour(&self) -> u32 {
        self.send_hour
    }

    /// True while inside the send hour and nothing has gone out today.
    pub async fn should_send_now(&self, now: DateTime<Utc>) -> bool {
        let (date, hour) = self.local(now);
        self.state.lock().await.is_due(date, hour, self.send_hour)
    }

    /// Records a confirmed delivery for `date`. Call only after the push succeeded.
    pub async fn mark_sent(&self, date: CalendarDate) {
        self.state.lock().await.last_sent = Some(date);
        info!(date = %date, "daily push marked as sent");
    }

    pub async fn last_sent(&self) -> Option<CalendarDate> {
        self.state.lock().await.last_sent
    }

    /// Atomically checks the gate and, when due, keeps it locked until the
    /// returned permit is dropped or consumed.
    ///
    /// Concurrent callers queue on the lock; once the holder marks the day as
    /// sent they observe the updated state and get `None`. Dropping the permit
    /// without [`DeliveryPermit::mark_sent`] leaves the day open for a retry.
    #[instrument(name = "gate.try_claim", skip(self))]
    pub async fn try_claim(&self, now: DateTime<Utc>) -> Option<DeliveryPermit> {
        let (date, hour) = self.local(now);
        let guard = Arc::clone(&self.state).lock_owned().await;
        if !guard.is_due(date, hour, self.send_hour) {
            debug!(date = %date, hour, last_sent = ?guard.last_sent, "daily push not due");
            return None;
        }
        Some(DeliveryPermit { date, guard })
    }

    fn local(&self, now: DateTime<Utc>) -> (CalendarDate, u32) {
        (
            self.timezone.to_calendar_date(now),
            self.timezone.local_hour(now),
        )
    }
}

/// Exclusive right to perform today's push.
#[derive(Debug)]
pub struct DeliveryPermit {
    date: CalendarDate,
    guard: OwnedMutexGuard<DeliveryGateState>,
}

impl DeliveryPermit {
    pub fn date(&self) -> CalendarDate {
        self.date
    }

    pub fn mark_sent(mut self) {
        self.guard.last_sent = Some(self.date);
        metrics::counter!("fortune_gate_marked_total").increment(1);
        info!(date = %self.date, "daily push marked as sent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn gate() -> DeliveryGate {
        DeliveryGate::new(Timezone::default(), DEFAULT_SEND_HOUR)
    }

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn at(day: CalendarDate, hour: u32, minute: u32) -> DateTime<Utc> {
        Timezone::default().at_local(day, hour, minute).unwrap()
    }

    #[tokio::test]
    async fn stays_open_until_marked() {
        let gate = gate();
        let today = date(2024, 3, 15);
        for minute in [0, 1, 15, 30, 59] {
            assert!(gate.should_send_now(at(today, 8, minute)).await);
        }
        gate.mark_sent(today).await;
        for minute in [0, 30, 59] {
            assert!(!gate.should_send_now(at(today, 8, minute)).await);
        }
        assert_eq!(gate.last_sent().await, Some(today));
    }

    #[tokio::test]
    async fn reopens_next_day() {
        let gate = gate();
        let today = date(2024, 3, 15);
        gate.mark_sent(today).await;
        let tomorrow = today.next_day().unwrap();
        assert!(gate.should_send_now(at(tomorrow, 8, 0)).await);
    }

    #[tokio::test]
    async fn closed_outside_send_hour() {
        let gate = gate();
        let today = date(2024, 3, 15);
        for hour in (0..24).filter(|h| *h != DEFAULT_SEND_HOUR) {
            assert!(!gate.should_send_now(at(today, hour, 0)).await);
        }
        gate.mark_sent(date(2024, 3, 10)).await;
        assert!(!gate.should_send_now(at(today, 7, 59)).await);
        assert!(!gate.should_send_now(at(today, 9, 0)).await);
    }

    #[tokio::test]
    async fn dropped_permit_leaves_day_open() {
        let gate = gate();
        let now = at(date(2024, 3, 15), 8, 5);
        let permit = gate.try_claim(now).await.expect("due");
        drop(permit);
        assert!(gate.should_send_now(now).await);

        let permit = gate.try_claim(now).await.expect("still due");
        assert_eq!(permit.date(), date(2024, 3, 15));
        permit.mark_sent();
        assert!(gate.try_claim(now).await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_send_once() {
        let gate = gate();
        let now = at(date(2024, 3, 15), 8, 0);
        let attempts = Arc::new(AtomicUsize::new(0));

        let tasks = (0..16).map(|_| {
            let gate = gate.clone();
            let attempts = attempts.clone();
            tokio::spawn(async move {
                if let Some(permit) = gate.try_claim(now).await {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    permit.mark_sent();
                }
            })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(gate.last_sent().await, Some(date(2024, 3, 15)));
    }
}
