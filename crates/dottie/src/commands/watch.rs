//! `dottie watch`: run the cache flush poller until Ctrl-C.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use dottie_core::{BroadcastInvalidator, CacheFlushPoller};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let settings = config::load(global)?;
    let interval = match args.interval {
        Some(interval) => interval,
        None => settings.flush_interval()?,
    };
    let dottie = config::connect(&settings)?;

    let invalidator = Arc::new(BroadcastInvalidator::new());
    let mut invalidations = invalidator.subscribe();

    let mut poller = CacheFlushPoller::new(Arc::new(dottie), invalidator).with_interval(interval);
    if !args.groups.is_empty() {
        poller = poller.with_groups(args.groups);
    }

    output::print_output(
        &format!(
            "watching cache flush markers every {} (Ctrl-C to stop)",
            humantime::format_duration(poller.interval())
        ),
        global.quiet,
    );
    let handle = poller.spawn();

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            received = invalidations.recv() => match received {
                Ok(group) => {
                    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                    output::print_output(&format!("{now}\t{group}\tinvalidated"), global.quiet);
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "invalidation stream lagged; treat all groups as stale");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}
