//! Common test utilities for integration tests
//! Runs the in-process development backend and builds clients against it

#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use devsync_client::{DevSyncApi, KeyValueStore, MemoryStore, SessionController, SessionStore};
use std::sync::Arc;

pub const PASSWORD: &str = "secret1";

/// A development backend listening on a random local port
pub struct TestBackend {
    pub base_url: String,
    handle: ServerHandle,
}

impl TestBackend {
    /// Spawn the backend and give it a moment to bind
    pub async fn spawn() -> Self {
        let (server, addr) = devsync_server::server::create_test_http_server()
            .expect("Failed to create test server");
        let handle = server.handle();
        tokio::spawn(server);

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestBackend {
            base_url: format!("http://{}/api", addr),
            handle,
        }
    }

    /// Client with a fresh in-memory session
    pub fn api(&self) -> Arc<DevSyncApi> {
        self.api_with_store(Arc::new(MemoryStore::new()))
    }

    pub fn api_with_store(&self, store: Arc<dyn KeyValueStore>) -> Arc<DevSyncApi> {
        let session = SessionStore::new(store);
        Arc::new(DevSyncApi::new(&self.base_url, session).expect("Failed to build API client"))
    }

    pub fn controller(&self) -> SessionController {
        SessionController::new(self.api())
    }

    /// Stop accepting connections; later requests fail at the transport level
    pub async fn stop(&self) {
        self.handle.stop(false).await;
    }
}

/// Register `username` with the shared test password
pub async fn register(api: &DevSyncApi, username: &str) {
    api.signup(username, &format!("{}@example.com", username), PASSWORD)
        .await
        .expect("Signup should succeed");
}

/// Register and sign in, returning the new user's id
pub async fn register_and_login(api: &DevSyncApi, username: &str) -> i64 {
    register(api, username).await;
    api.login(username, PASSWORD)
        .await
        .expect("Login should succeed")
        .id
}
