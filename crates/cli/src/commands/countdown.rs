//! Live countdown.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use luxe_storefront::countdown::CountdownTimer;

/// Print the time left until `until` on every tick.
///
/// Stops when the countdown expires or after `max_ticks` updates.
#[allow(clippy::print_stdout)]
pub async fn run(until: DateTime<Utc>, tick: Duration, max_ticks: Option<usize>) {
    let timer = CountdownTimer::spawn(until, tick);
    let mut updates = timer.subscribe();
    let mut printed = 0usize;

    loop {
        let current = *updates.borrow_and_update();
        match current {
            Some(left) => println!("{left}"),
            None => {
                println!("Expired");
                break;
            }
        }

        printed += 1;
        if max_ticks.is_some_and(|max| printed >= max) {
            break;
        }
        if updates.changed().await.is_err() {
            break;
        }
    }

    info!(%until, ticks = printed, "Countdown finished");
    timer.cancel();
}
