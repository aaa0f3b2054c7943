//! Auction countdown.
//!
//! [`evaluate`] is the pure calculation. [`Countdown`] re-evaluates it once a
//! second on a background task and publishes the result on a `watch`
//! channel until the end time passes or the handle is stopped.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

const TICK: Duration = Duration::from_secs(1);

/// Time left before an end time, in whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Remaining {
    /// Split a number of seconds into days, hours, minutes and seconds.
    #[must_use]
    pub const fn from_seconds(total: u64) -> Self {
        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }
}

/// `1d 1h 1m 1s`, or `0h 4m 10s` when there are no whole days left.
impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

/// Countdown state. `Expired` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running(Remaining),
    Expired,
}

impl CountdownState {
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running(remaining) => fmt::Display::fmt(remaining, f),
            Self::Expired => f.write_str("Auction ended"),
        }
    }
}

/// State of a countdown to `end` as seen at `now`.
///
/// Expired once the difference is zero or negative; otherwise the remaining
/// time is truncated to whole seconds.
#[must_use]
pub fn evaluate(end: DateTime<Utc>, now: DateTime<Utc>) -> CountdownState {
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        return CountdownState::Expired;
    }
    CountdownState::Running(Remaining::from_seconds(millis.unsigned_abs() / 1000))
}

type ExpiryCallback = Box<dyn FnOnce() + Send + 'static>;

/// A countdown to a fixed end time.
pub struct Countdown {
    end: DateTime<Utc>,
    on_expire: Option<ExpiryCallback>,
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("end", &self.end)
            .field("on_expire", &self.on_expire.is_some())
            .finish()
    }
}

impl Countdown {
    #[must_use]
    pub fn new(end: DateTime<Utc>) -> Self {
        Self {
            end,
            on_expire: None,
        }
    }

    /// Run `callback` once when the countdown expires.
    #[must_use]
    pub fn on_expire(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_expire = Some(Box::new(callback));
        self
    }

    /// Evaluate now and, unless already expired, keep re-evaluating every
    /// second in the background.
    ///
    /// An end time already in the past yields `Expired` straight away and
    /// runs the expiry callback before this returns. Must be called from
    /// within a tokio runtime.
    #[must_use]
    pub fn start(self) -> CountdownHandle {
        let Self { end, mut on_expire } = self;
        let initial = evaluate(end, Utc::now());
        let (sender, receiver) = watch::channel(initial);

        if initial.is_expired() {
            if let Some(callback) = on_expire.take() {
                callback();
            }
            return CountdownHandle {
                receiver,
                task: None,
            };
        }

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial state is
            // already published.
            interval.tick().await;

            loop {
                interval.tick().await;
                let state = evaluate(end, Utc::now());
                sender.send_replace(state);

                if state.is_expired() {
                    debug!(%end, "Countdown expired");
                    if let Some(callback) = on_expire.take() {
                        callback();
                    }
                    break;
                }
            }
        });

        CountdownHandle {
            receiver,
            task: Some(task),
        }
    }
}

/// Handle to a running countdown. Dropping it stops the ticks.
#[derive(Debug)]
pub struct CountdownHandle {
    receiver: watch::Receiver<CountdownState>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    /// The latest state.
    #[must_use]
    pub fn state(&self) -> CountdownState {
        *self.receiver.borrow()
    }

    /// A receiver that is notified on every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.receiver.clone()
    }

    /// Stop ticking. The last published state stays readable through
    /// existing receivers.
    pub fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn test_evaluate_decomposes_days_hours_minutes_seconds() {
        let now = Utc::now();
        let state = evaluate(now + TimeDelta::seconds(90_061), now);
        assert_eq!(
            state,
            CountdownState::Running(Remaining {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
            })
        );
        assert_eq!(state.to_string(), "1d 1h 1m 1s");
    }

    #[test]
    fn test_display_omits_zero_days() {
        let now = Utc::now();
        let state = evaluate(now + TimeDelta::seconds(250), now);
        assert_eq!(state.to_string(), "0h 4m 10s");

        let exactly_one_day = Remaining::from_seconds(86_400);
        assert_eq!(exactly_one_day.to_string(), "1d 0h 0m 0s");
    }

    #[test]
    fn test_evaluate_non_positive_is_expired() {
        let now = Utc::now();
        assert_eq!(evaluate(now, now), CountdownState::Expired);
        assert_eq!(
            evaluate(now - TimeDelta::seconds(5), now),
            CountdownState::Expired
        );
    }

    #[test]
    fn test_evaluate_truncates_partial_seconds() {
        let now = Utc::now();
        let state = evaluate(now + TimeDelta::milliseconds(1_999), now);
        assert_eq!(state, CountdownState::Running(Remaining::from_seconds(1)));

        let state = evaluate(now + TimeDelta::milliseconds(400), now);
        assert_eq!(state, CountdownState::Running(Remaining::from_seconds(0)));
    }

    #[test]
    fn test_remaining_splits_units() {
        let left = Remaining::from_seconds(90_061);
        assert_eq!((left.days, left.hours, left.minutes, left.seconds), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn test_first_state_is_reported_immediately() {
        let end = Utc::now() + TimeDelta::seconds(90_061) + TimeDelta::milliseconds(500);
        let handle = Countdown::new(end).start();
        assert_eq!(
            handle.state(),
            CountdownState::Running(Remaining {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
            })
        );
        handle.stop();
    }

    #[tokio::test]
    async fn test_past_end_expires_immediately_and_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let handle = Countdown::new(Utc::now() - TimeDelta::seconds(1))
            .on_expire(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .start();

        assert_eq!(handle.state(), CountdownState::Expired);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_running_countdown_expires_and_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let handle = Countdown::new(Utc::now() + TimeDelta::milliseconds(300))
            .on_expire(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .start();
        assert!(!handle.state().is_expired());

        let mut receiver = handle.subscribe();
        tokio::time::timeout(
            Duration::from_secs(3),
            receiver.wait_for(CountdownState::is_expired),
        )
        .await
        .expect("countdown did not expire")
        .expect("countdown channel closed");

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
