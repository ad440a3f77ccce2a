//! Process lifecycle: connect the store, bind the listener, and tear both down.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use blog_infra::store::{self, DocumentStore, StoreError};
use blog_infra::BlogModel;

use crate::app;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("server task failed: {0}")]
    Serve(String),
}

/// A started server: the store connection plus the listener task.
pub struct RunningServer {
    addr: SocketAddr,
    store: Arc<dyn DocumentStore>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

/// Connect to `database_url`, then listen on `port` (0 picks an ephemeral port).
///
/// Returns once both have succeeded. If anything after the connect fails the
/// store is disconnected again before the error is returned.
pub async fn start(database_url: &str, port: u16) -> Result<RunningServer, LifecycleError> {
    let store = store::connect(database_url).await?;
    serve_store(store, port).await
}

/// Listen on `port` with an already connected store. The store is owned from here on.
pub async fn serve_store(
    store: Arc<dyn DocumentStore>,
    port: u16,
) -> Result<RunningServer, LifecycleError> {
    let (listener, addr) = match bind(port).await {
        Ok(bound) => bound,
        Err(err) => {
            if let Err(e) = store.disconnect().await {
                tracing::warn!("store disconnect after failed bind: {e}");
            }
            return Err(err);
        }
    };

    let router = app::build_app(BlogModel::new(store.clone()));
    let (shutdown, signal) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = signal.await;
            })
            .await
    });

    tracing::info!("your app is listening on port {}", addr.port());
    Ok(RunningServer {
        addr,
        store,
        shutdown,
        handle,
    })
}

async fn bind(port: u16) -> Result<(TcpListener, SocketAddr), LifecycleError> {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .map_err(|source| LifecycleError::Bind { port, source })?;
    let addr = listener
        .local_addr()
        .map_err(|source| LifecycleError::Bind { port, source })?;
    Ok((listener, addr))
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Loopback URL for the bound port, e.g. `http://127.0.0.1:8080`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", Ipv4Addr::LOCALHOST, self.addr.port())
    }

    /// Disconnect the store, then close the listener.
    ///
    /// Resolves after both have completed; in-flight requests are allowed to finish.
    pub async fn stop(self) -> Result<(), LifecycleError> {
        let disconnected = self.store.disconnect().await;

        tracing::info!("closing server");
        let _ = self.shutdown.send(());
        let served = self.handle.await;

        disconnected?;
        match served {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(LifecycleError::Serve(e.to_string())),
            Err(e) => Err(LifecycleError::Serve(e.to_string())),
        }
    }
}
