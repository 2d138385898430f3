use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{broadcast, mpsc};

use folio_core::WatchSettings;
use folio_sync::{RunReport, SyncError};

use crate::error::WatchError;
use crate::server::{build_router, ResyncRequest, Trigger, WebhookState};

/// Quiet period after a trigger before a resync starts. Requests arriving
/// within it are folded into the same resync.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Runs one full sync. Called once per coalesced batch of requests.
pub type ResyncFn = Arc<dyn Fn() -> BoxFuture<'static, Result<RunReport, SyncError>> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub addr: SocketAddr,
    pub initial_sync: bool,
    pub debounce: Duration,
}

impl WatchOptions {
    pub fn from_settings(settings: &WatchSettings) -> Result<Self, WatchError> {
        let raw = format!("{}:{}", settings.host, settings.port);
        let addr = raw.parse().map_err(|_| WatchError::Address(raw))?;
        Ok(Self {
            addr,
            initial_sync: true,
            debounce: DEBOUNCE_WINDOW,
        })
    }
}

/// Serve webhooks until ctrl-c.
///
/// Four tasks share one shutdown broadcast: the HTTP server, the resync
/// processor, the initial sync trigger and the signal handler. Whichever
/// task ends first shuts the others down.
pub async fn run(options: WatchOptions, resync: ResyncFn) -> Result<(), WatchError> {
    let listener = tokio::net::TcpListener::bind(options.addr)
        .await
        .map_err(|source| WatchError::Bind {
            addr: options.addr,
            source,
        })?;
    tracing::info!(addr = %options.addr, "watch server listening");

    let (resync_tx, resync_rx) = mpsc::unbounded_channel::<ResyncRequest>();
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let server_handle = {
        let shutdown = shutdown_tx.clone();
        let state = WebhookState::new(resync_tx.clone());
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            let result = axum::serve(listener, build_router(state))
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .map_err(WatchError::Serve);
            let _ = shutdown.send(());
            result
        })
    };

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        let debounce = options.debounce;
        tokio::spawn(async move {
            let result =
                resync_processor_task(resync_rx, resync, debounce, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let initial_handle = {
        let enabled = options.initial_sync;
        tokio::spawn(async move {
            if enabled && resync_tx.send(ResyncRequest::new(Trigger::Initial)).is_err() {
                tracing::warn!("resync processor is gone; initial sync skipped");
            }
            Ok::<(), WatchError>(())
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down watch server");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(WatchError::Signal(err)),
                    }
                }
            }
        })
    };

    let (server_result, processor_result, initial_result, signal_result) = tokio::join!(
        server_handle,
        processor_handle,
        initial_handle,
        signal_handle
    );

    handle_join("http_server", server_result)?;
    handle_join("resync_processor", processor_result)?;
    handle_join("initial_sync", initial_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn resync_processor_task(
    mut resync_rx: mpsc::UnboundedReceiver<ResyncRequest>,
    resync: ResyncFn,
    debounce: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    loop {
        let first = tokio::select! {
            _ = shutdown_rx.recv() => break,
            request = resync_rx.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(debounce) => {}
        }
        let coalesced = 1 + drain_pending(&mut resync_rx);
        tracing::debug!(trigger = ?first.trigger, coalesced, "starting resync");

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            result = resync() => match result {
                Ok(report) => {
                    let totals = &report.summary.totals;
                    tracing::info!(
                        created = totals.created,
                        updated = totals.updated,
                        deleted = totals.deleted,
                        skipped = totals.skipped,
                        failed = totals.failed,
                        duration_ms = report.elapsed().num_milliseconds(),
                        "resync completed"
                    );
                }
                Err(err) => {
                    tracing::error!(error = %err, "resync failed");
                }
            },
        }
    }

    Ok(())
}

/// Discard every request already queued; returns how many there were.
fn drain_pending(rx: &mut mpsc::UnboundedReceiver<ResyncRequest>) -> usize {
    let mut drained = 0;
    while rx.try_recv().is_ok() {
        drained += 1;
    }
    drained
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), WatchError>, tokio::task::JoinError>,
) -> Result<(), WatchError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(WatchError::Join {
            task,
            reason: err.to_string(),
        }),
    }
}

/// Install the `tracing` subscriber on stderr, honouring `RUST_LOG` and
/// defaulting to `info`. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use folio_core::StatsSummary;
    use futures::FutureExt;

    fn counting_resync(counter: Arc<AtomicUsize>) -> ResyncFn {
        Arc::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let now = Utc::now();
                Ok::<_, SyncError>(RunReport {
                    summary: StatsSummary::default(),
                    deleted: Vec::new(),
                    processed: 0,
                    dry_run: false,
                    started_at: now,
                    finished_at: now,
                })
            }
            .boxed()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_requests_coalesces_into_one_resync() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel(4);

        let processor = tokio::spawn(resync_processor_task(
            rx,
            counting_resync(counter.clone()),
            DEBOUNCE_WINDOW,
            shutdown_tx.subscribe(),
        ));

        for _ in 0..5 {
            tx.send(ResyncRequest::new(Trigger::Ping)).unwrap();
        }
        tokio::time::sleep(DEBOUNCE_WINDOW * 2).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tx.send(ResyncRequest::new(Trigger::Webhook {
            entity_id: "e1".into(),
        }))
        .unwrap();
        tokio::time::sleep(DEBOUNCE_WINDOW * 2).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        let _ = shutdown_tx.send(());
        processor.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn processor_exits_when_queue_closes() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel::<ResyncRequest>();
        let (shutdown_tx, _) = broadcast::channel(4);
        drop(tx);
        resync_processor_task(
            rx,
            counting_resync(counter.clone()),
            Duration::from_millis(1),
            shutdown_tx.subscribe(),
        )
        .await
        .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn options_from_settings() {
        let options = WatchOptions::from_settings(&WatchSettings::default()).unwrap();
        assert_eq!(options.addr.port(), folio_core::config::DEFAULT_WATCH_PORT);
        assert!(options.initial_sync);

        let bad = WatchSettings {
            host: "not a host".into(),
            port: 80,
        };
        assert!(matches!(
            WatchOptions::from_settings(&bad),
            Err(WatchError::Address(_))
        ));
    }

    #[test]
    fn drain_counts_queued_requests() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for _ in 0..3 {
            tx.send(ResyncRequest::new(Trigger::Ping)).unwrap();
        }
        assert_eq!(drain_pending(&mut rx), 3);
        assert_eq!(drain_pending(&mut rx), 0);
    }
}
