use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::info;

use crate::config::Config;
use crate::http::connection::{Connection, Timeouts};
use crate::http::router::Router;

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not
/// spin the loop.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: &Config, router: Arc<Router>) -> anyhow::Result<()> {
    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to address: {}", addr))?;
    info!("Listening on {}", addr);
    for route in router.routes() {
        info!(method = route.method(), pattern = route.pattern().as_str(), "Route");
    }

    serve(listener, router, cfg.timeouts()).await
}

/// Accepts connections forever, one task per connection.
///
/// Accept errors are logged and the loop keeps going. Dropping the returned
/// future aborts every connection still in flight.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    timeouts: Timeouts,
) -> anyhow::Result<()> {
    let mut connections = JoinSet::new();

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!(error = %e, "Error accepting connection");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = router.clone();
        connections.spawn(async move {
            let conn = Connection::new(socket, router, timeouts);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {:#}", peer, e);
            }
        });

        while let Some(done) = connections.try_join_next() {
            if let Err(e) = done {
                if e.is_panic() {
                    tracing::error!(error = %e, "Connection task panicked");
                }
            }
        }
    }
}
