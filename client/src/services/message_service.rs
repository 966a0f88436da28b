/// Message service for channel, direct and thread conversations.
///
/// Pages arrive newest first from the backend and are handed out oldest
/// first, ready to render top to bottom. Thread replies keep backend order.

use crate::api::DevSyncApi;
use crate::error::Result;
use crate::models::{Message, MessageView, OutgoingMessage, Page, PageRequest};
use crate::validation;
use std::sync::Arc;

pub struct MessageService {
    api: Arc<DevSyncApi>,
}

impl MessageService {
    pub fn new(api: Arc<DevSyncApi>) -> Self {
        MessageService { api }
    }

    fn to_views(&self, messages: Vec<Message>) -> Result<Vec<MessageView>> {
        // Read on every call so a login or logout in between is picked up
        let current_user_id = self.api.current_user_id()?;
        Ok(messages
            .into_iter()
            .map(|m| MessageView::new(m, current_user_id))
            .collect())
    }

    fn chronological(&self, page: Page<Message>) -> Result<Vec<MessageView>> {
        let mut messages = page.content;
        messages.reverse();
        self.to_views(messages)
    }

    pub async fn channel_messages(&self, channel_id: i64, page: PageRequest) -> Result<Vec<MessageView>> {
        let page = self.api.channel_messages(channel_id, page).await?;
        self.chronological(page)
    }

    pub async fn direct_messages(&self, user_id: i64, page: PageRequest) -> Result<Vec<MessageView>> {
        let page = self.api.direct_messages(user_id, page).await?;
        self.chronological(page)
    }

    pub async fn thread_replies(&self, message_id: i64) -> Result<Vec<MessageView>> {
        let replies = self.api.thread_replies(message_id).await?;
        self.to_views(replies)
    }

    /// Post to a channel, optionally as a reply to `parent_id`
    pub async fn send_channel_message(
        &self,
        channel_id: i64,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<MessageView> {
        let message = outgoing(content, parent_id)?;
        let sent = self.api.send_channel_message(channel_id, &message).await?;
        self.single_view(sent)
    }

    pub async fn send_direct_message(
        &self,
        user_id: i64,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<MessageView> {
        let message = outgoing(content, parent_id)?;
        let sent = self.api.send_direct_message(user_id, &message).await?;
        self.single_view(sent)
    }

    fn single_view(&self, message: Message) -> Result<MessageView> {
        Ok(MessageView::new(message, self.api.current_user_id()?))
    }
}

fn outgoing(content: &str, parent_id: Option<i64>) -> Result<OutgoingMessage> {
    validation::validate_message_content(content)?;
    let message = OutgoingMessage::text(content);
    Ok(match parent_id {
        Some(parent_id) => message.in_reply_to(parent_id),
        None => message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn test_blank_content_rejected() {
        assert!(matches!(outgoing("   ", None), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_reply_carries_parent() {
        let message = outgoing("re: hello", Some(10)).unwrap();
        assert_eq!(message.parent_message_id, Some(10));
        assert_eq!(message.content, "re: hello");
    }
}
