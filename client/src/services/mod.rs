/// Service layer for the DevSync client.
/// Turns raw API results into the view models a front end renders.

pub mod channel_service;
pub mod message_service;

pub use channel_service::ChannelService;
pub use message_service::MessageService;
