/// Channel service: listing, creating and joining channels.

use crate::api::DevSyncApi;
use crate::error::Result;
use crate::models::{Channel, ChannelView, MessageResponse, NewChannel};
use crate::validation;
use std::sync::Arc;

pub struct ChannelService {
    api: Arc<DevSyncApi>,
}

impl ChannelService {
    pub fn new(api: Arc<DevSyncApi>) -> Self {
        ChannelService { api }
    }

    /// Channels visible to the signed-in user, ready for a channel list
    pub async fn user_channels(&self) -> Result<Vec<ChannelView>> {
        let channels = self.api.channels().await?;
        log::debug!("Fetched {} channels", channels.len());
        Ok(channels.into_iter().map(ChannelView::from).collect())
    }

    pub async fn create_channel(
        &self,
        name: &str,
        description: Option<&str>,
        is_private: bool,
    ) -> Result<Channel> {
        validation::validate_channel(name, description)?;

        let request = NewChannel {
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            is_private,
        };

        let channel = self.api.create_channel(&request).await?;
        log::info!("Created channel {} (id {})", channel.name, channel.id);
        Ok(channel)
    }

    pub async fn join_channel(&self, channel_id: i64) -> Result<MessageResponse> {
        self.api.join_channel(channel_id).await
    }
}
