use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::SharedStore;
use crate::router::build_router;

/// HTTP server in front of an object store.
pub struct ObjstoreServer {
    config: ServerConfig,
    store: SharedStore,
}

impl ObjstoreServer {
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.store.clone())
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let addr: SocketAddr = listener.local_addr()?;
        info!(%addr, "objstore server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        info!("objstore server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objstore_core::{LatticeObjectStore, StoreConfig};
    use objstore_kvs::InMemoryKvs;
    use std::sync::Arc;

    fn server(config: ServerConfig) -> ObjstoreServer {
        let store = LatticeObjectStore::new(InMemoryKvs::new().client(), StoreConfig::default());
        ObjstoreServer::new(config, Arc::new(store))
    }

    #[test]
    fn server_construction() {
        let s = server(ServerConfig::default());
        assert_eq!(s.config().bind_addr, "127.0.0.1:50051".parse().unwrap());
        let _router = s.router();
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..Default::default()
        };
        server(config).serve(async {}).await.unwrap();
    }
}
