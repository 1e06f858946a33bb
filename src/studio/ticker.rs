//! Cosmetic progress text for the video stage.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const INITIAL_VIDEO_STATUS: &str = "Contacting Media Engine...";
pub const VIDEO_FAILURE_STATUS: &str = "Video production encountered an error.";

pub const VIDEO_STATUS_PHRASES: [&str; 6] = [
    "Calibrating studio lighting...",
    "Setting up camera gimbal...",
    "Rendering volumetric rays...",
    "Simulating fluid dynamics...",
    "Finalizing high-res export...",
    "Optimizing bitrate...",
];

/// Phrase for the `n`th tick, wrapping around the list.
pub fn phrase_at(n: usize) -> &'static str {
    VIDEO_STATUS_PHRASES[n % VIDEO_STATUS_PHRASES.len()]
}

/// Drive `task` to completion, publishing the next phrase every `period`.
///
/// The interval is owned by this future and released on every exit path of `task`.
/// A zero period disables the ticker.
pub async fn with_status_ticker<F, P>(task: F, period: Duration, mut publish: P) -> F::Output
where
    F: Future,
    P: FnMut(&'static str),
{
    if period.is_zero() {
        return task.await;
    }

    tokio::pin!(task);
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut index = 0usize;

    loop {
        tokio::select! {
            biased;
            output = &mut task => return output,
            _ = ticks.tick() => {
                publish(phrase_at(index));
                index += 1;
            }
        }
    }
}
