//! The poll scheduler.
//!
//! A single long-lived Tokio task that decides when sync cycles run and
//! awaits each cycle before considering the next trigger, so cycles never
//! overlap. A cycle that fails internally has already been absorbed by the
//! engine; nothing here ever stops the loop except cancellation.

use std::sync::Arc;

use attsync_core::schedule::{matched_run_time, PollPolicy, RUN_TIME_TICK};
use chrono::Local;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::engine::sync::SyncEngine;

/// Run the scheduler loop until `cancel` is triggered.
pub async fn run(engine: Arc<SyncEngine>, policy: PollPolicy, cancel: CancellationToken) {
    tracing::info!(policy = ?policy, "Device sync scheduler started");

    // Harvest the fleet once at startup, before the first tick.
    engine.run_cycle().await;

    match policy {
        PollPolicy::Interval(period) => {
            let mut ticker = tokio::time::interval(period);
            // A tick that lands while a cycle is still running waits for
            // it instead of piling up.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial cycle
            // already covered it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        engine.run_cycle().await;
                    }
                }
            }
        }
        PollPolicy::RunTimes(times) => {
            let mut ticker = tokio::time::interval(RUN_TIME_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        // Wall-clock time of day; a process that sleeps
                        // through a window simply skips that day's run.
                        if let Some(run_time) = matched_run_time(Local::now().time(), &times) {
                            tracing::info!(run_time = %run_time, "Named run time reached");
                            engine.run_cycle().await;
                        }
                    }
                }
            }
        }
    }

    tracing::info!("Device sync scheduler stopped");
}
