/// DevSync development backend
/// SQLite-backed implementation of the DevSync REST API, used for local runs
/// and as the integration-test backend of the client.

pub mod config;
pub mod db;
pub mod handlers;
pub mod server;
