#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
//! Sets up the service log and emits a few structured records from concurrent tasks.

use std::time::Duration;

use clap::Parser as _;
use log::{info, warn};
use service_log::{DynError, LogConfig, LogInitializer, LogSetup, Param};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), DynError> {
    let param = Param::parse();
    let config = LogConfig::try_from(&param)?;
    let cancel = CancellationToken::new();

    let initializer = LogInitializer::new(config);
    // a service must not run without its log
    let mut handle = match initializer.initialize(&param.service_name, &cancel) {
        Ok(handle) => handle,
        Err(log_init_error) => {
            eprintln!("init log error: {log_init_error}");
            std::process::exit(1);
        }
    };

    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, stopping workers");
            cancel_on_signal.cancel();
        }
    });

    let workers = (0..param.workers)
        .map(|worker| {
            let cancel = cancel.clone();
            let records = param.records;
            tokio::spawn(async move {
                for seq in 0..records {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(Duration::from_millis(100)) => {
                            info!(worker = worker, seq = seq; "sample record");
                        }
                    }
                }
            })
        })
        .collect::<Vec<_>>();
    for worker in workers {
        if let Err(e) = worker.await {
            warn!("worker exited abnormally: {e}");
        }
    }

    info!("done, log file is {}", handle.log_file().display());
    handle.close();
    Ok(())
}
