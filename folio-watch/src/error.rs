use std::net::SocketAddr;

use thiserror::Error;

/// Error surface for the watch server and its resync processor.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid listen address '{0}'")]
    Address(String),

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("sync error: {0}")]
    Sync(#[from] folio_sync::SyncError),

    #[error("{task} task join failure: {reason}")]
    Join { task: &'static str, reason: String },

    #[error("ctrl-c handler failed: {0}")]
    Signal(#[source] std::io::Error),
}
