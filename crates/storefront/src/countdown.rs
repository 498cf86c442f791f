//! Countdown to a target instant.
//!
//! [`remaining`] is the pure computation; [`CountdownTimer`] republishes it
//! on a fixed delay until the target passes or the timer is dropped.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Time left until a target, split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    /// Whole days.
    pub days: i64,
    /// Hours past the last whole day, `0..24`.
    pub hours: i64,
    /// `0..60`
    pub minutes: i64,
    /// `0..60`
    pub seconds: i64,
}

/// Time left from `now` until `target`, or `None` once the target is reached.
#[must_use]
pub fn remaining(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Remaining> {
    let ms = (target - now).num_milliseconds();
    if ms <= 0 {
        return None;
    }

    Some(Remaining {
        days: ms / MS_PER_DAY,
        hours: (ms / MS_PER_HOUR) % 24,
        minutes: (ms / MS_PER_MINUTE) % 60,
        seconds: (ms / MS_PER_SECOND) % 60,
    })
}

impl fmt::Display for Remaining {
    /// Two-digit units; days are left out when zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{:02}d ", self.days)?;
        }
        write!(
            f,
            "{:02}h {:02}m {:02}s",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// A ticking countdown.
///
/// The latest value is available through [`CountdownTimer::current`] or a
/// [`watch::Receiver`]. Ticking stops once the countdown expires (the expired
/// `None` is published once) or when the timer is cancelled or dropped.
#[derive(Debug)]
pub struct CountdownTimer {
    rx: watch::Receiver<Option<Remaining>>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Start ticking toward `target`, recomputing `tick` after each publish.
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use = "dropping the timer stops it"]
    pub fn spawn(target: DateTime<Utc>, tick: Duration) -> Self {
        let initial = remaining(target, Utc::now());
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            if initial.is_none() {
                return;
            }
            loop {
                tokio::time::sleep(tick).await;
                let value = remaining(target, Utc::now());
                tx.send_replace(value);
                if value.is_none() {
                    debug!(%target, "Countdown expired");
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// Latest published value. `None` once expired.
    #[must_use]
    pub fn current(&self) -> Option<Remaining> {
        *self.rx.borrow()
    }

    /// Receive every published value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Remaining>> {
        self.rx.clone()
    }

    /// Whether ticking has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop ticking.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
