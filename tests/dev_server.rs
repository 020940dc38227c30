//! Monitor against the Axum dev server (requires `--features ssr`)

#![cfg(feature = "ssr")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use studymate::backend::server::create_app;
use studymate::client::{ConnectionMonitor, HttpHealthProbe, LocalFallbackStore, MemoryBackend, MonitorConfig};
use studymate::shared::HealthResponse;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct DevServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl DevServer {
    async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, create_app())
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await
                .unwrap();
        });
        Self { addr, shutdown, handle }
    }

    fn health_url(&self) -> String {
        format!("http://{}/api/health", self.addr)
    }

    /// Stop accepting, close open connections and wait for the server task
    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_health_endpoint_shape() {
    let server = DevServer::start().await;

    let response = reqwest::get(server.health_url()).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: HealthResponse = response.json().await.unwrap();
    assert!(body.is_healthy());
    assert!(body.timestamp.is_some());
    assert!(body.extra.contains_key("uptimeSeconds"));

    server.stop().await;
}

#[tokio::test]
async fn test_monitor_tracks_server_lifecycle() {
    let server = DevServer::start().await;

    let probe = HttpHealthProbe::new(server.health_url(), Duration::from_secs(2)).unwrap();
    let store = LocalFallbackStore::new(Arc::new(MemoryBackend::new()));
    let monitor = ConnectionMonitor::new(MonitorConfig::default(), Arc::new(probe), store);

    assert!(monitor.check_connection(false).await);
    assert_eq!(monitor.status().retry_count, 0);

    server.stop().await;

    assert!(!monitor.check_connection(true).await);
    let status = monitor.status();
    assert!(!status.is_online);
    assert_eq!(status.retry_count, 1);
}
