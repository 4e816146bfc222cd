use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    probe::{ActiveAppProbe, UNKNOWN_APP},
    storage::interval_store::IntervalSink,
    utils::clock::Clock,
};

use super::state::FocusState;

/// The sampling loop. Polls the probe at a fixed cadence, closes an interval
/// on every application switch and appends it to the sink.
pub struct SamplingModule<S> {
    sink: S,
    probe: Box<dyn ActiveAppProbe>,
    shutdown: CancellationToken,
    poll_interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl<S: IntervalSink> SamplingModule<S> {
    pub fn new(
        sink: S,
        probe: Box<dyn ActiveAppProbe>,
        shutdown: CancellationToken,
        poll_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            sink,
            probe,
            shutdown,
            poll_interval,
            time_provider,
        }
    }

    /// Takes one probe sample. A failing probe never stops tracking, the
    /// sample degrades to the `Unknown` pseudo-application instead.
    fn sample(&mut self) -> Arc<str> {
        match self.probe.current_app() {
            Ok(app) => app,
            Err(e) => {
                warn!("Probe could not identify the active application {e:?}");
                UNKNOWN_APP.into()
            }
        }
    }

    /// Executes the sampling event loop.
    ///
    /// The sleep between samples is the only suspension point. A slow probe or
    /// sink stretches the sampling period, which is acceptable drift since
    /// only relative switch detection matters.
    pub async fn run(mut self) -> Result<()> {
        let initial = self.sample();
        let mut state = FocusState::new(initial, self.time_provider.time());
        let mut sample_point = self.time_provider.instant();
        loop {
            sample_point += self.poll_interval;

            tokio::select! {
                // Cancelation ends tracking without closing the in-progress
                // interval. The segment that was still open when the user hit
                // ctrl-c is dropped, never persisted half-measured.
                _ = self.shutdown.cancelled() => {
                    info!("Cancellation requested, tracking stopped");
                    return Ok(());
                }
                _ = self.time_provider.sleep_until(sample_point) => ()
            }

            let sample = self.sample();
            if let Some(interval) = state.observe(sample, self.time_provider.time()) {
                debug!("Closing interval {:?}", interval);
                let announcement = format!(
                    "Logged: {}, Duration: {} seconds",
                    interval.app_name, interval.duration_seconds
                );
                self.sink
                    .append(interval)
                    .await
                    .inspect_err(|e| error!("Unexpected error during appending {e:?}"))
                    .context("Failed to append a closed interval")?;
                println!("{announcement}");
            }
        }
    }
}
