/// DevSync Client Library
/// Authenticated access to the DevSync chat backend: session storage,
/// typed REST calls and the session lifecycle controller.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod validation;

pub use api::DevSyncApi;
pub use config::ClientConfig;
pub use controller::{AuthPhase, AuthState, SessionController};
pub use error::{ClientError, Result};
pub use session::SessionStore;
pub use storage::{KeyValueStore, LocalStore, MemoryStore};
