use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use sampler::SamplingModule;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    probe::{ActiveAppProbe, GenericProbe},
    storage::interval_store::{IntervalSink, IntervalStore},
    utils::clock::{Clock, DefaultClock},
};

pub mod sampler;
pub mod shutdown;
pub mod state;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Represents the starting point for the tracker.
///
/// Runs until interrupted. The interrupt is a clean stop, not an error, so the
/// process exits 0 after it.
pub async fn start_tracker(data_dir: PathBuf, poll_interval: Duration) -> Result<()> {
    let probe = GenericProbe::new()?;
    let store = IntervalStore::new(data_dir)?;

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown::cancel_on_interrupt(shutdown_token.clone()));

    let sampler = create_sampler(store, probe, &shutdown_token, poll_interval, DefaultClock);

    println!("Tracking application usage. Press Ctrl+C to stop.");

    let tracking_result = sampler.run().await;

    match &tracking_result {
        Ok(()) => println!("\nTracking stopped."),
        Err(e) => error!("Tracking module got an error {:?}", e),
    }

    tracking_result
}

fn create_sampler<S: IntervalSink>(
    sink: S,
    probe: impl ActiveAppProbe + 'static,
    shutdown_token: &CancellationToken,
    poll_interval: Duration,
    clock: impl Clock,
) -> SamplingModule<S> {
    SamplingModule::new(
        sink,
        Box::new(probe),
        shutdown_token.clone(),
        poll_interval,
        Box::new(clock),
    )
}

#[cfg(test)]
mod tracker_tests {
    use std::time::Duration;

    use anyhow::Result;
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    use crate::{
        probe::MockActiveAppProbe,
        report::generate,
        storage::interval_store::{IntervalSource, IntervalStore},
        tracker::create_sampler,
        utils::{clock::DefaultClock, logging::TEST_LOGGING},
    };

    /// Very simple smoke test running the whole pipeline in real time: mocked
    /// probe, real store on disk, real clock, then a report over the result.
    /// Durations are asserted elsewhere with a warped clock, real-time floors
    /// jitter around tick boundaries.
    #[tokio::test]
    async fn smoke_test_tracker() -> Result<()> {
        *TEST_LOGGING;
        let mut probe = MockActiveAppProbe::new();
        let mut samples = ["editor", "editor", "browser"].into_iter().cycle();
        probe
            .expect_current_app()
            .returning(move || Ok(samples.next().unwrap().into()))
            .times(..7);

        let shutdown_token = CancellationToken::new();
        let dir = tempdir()?;
        let store = IntervalStore::new(dir.path().to_path_buf())?;

        let sampler = create_sampler(
            store,
            probe,
            &shutdown_token,
            Duration::from_secs(1),
            DefaultClock,
        );

        let (_, tracking_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(5500)).await;
                shutdown_token.cancel()
            },
            sampler.run(),
        );

        tracking_result?;

        let store = IntervalStore::new(dir.path().to_path_buf())?;
        let intervals = store.scan_all().await?;

        let apps = intervals
            .iter()
            .map(|v| &*v.app_name)
            .collect::<Vec<_>>();
        assert_eq!(apps, vec!["editor", "browser", "editor"]);

        let report = generate(&store, &chrono::Utc).await?;
        assert_eq!(report.len(), 2);
        // The editor held focus for two segments, so it leads its date.
        assert_eq!(&*report[0].app_name, "editor");
        assert_eq!(&*report[1].app_name, "browser");
        assert_eq!(report[0].date, report[1].date);

        Ok(())
    }
}
