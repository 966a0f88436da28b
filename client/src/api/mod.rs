//! DevSync REST API client
//!
//! One method per backend endpoint. Each call reads the current token from
//! the session store, sends a single request and decodes the response.
//! There is no retry, no caching and no client-side timeout.

pub mod headers;
pub mod response;

use crate::error::Result;
use crate::models::{
    AuthResponse, Channel, LoginRequest, Message, MessageResponse, NewChannel, OutgoingMessage,
    Page, PageRequest, SignupRequest, User, UserStatus,
};
use crate::session::SessionStore;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder};

/// Typed client for the DevSync backend
pub struct DevSyncApi {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl DevSyncApi {
    /// Create a client for `base_url` (e.g. `http://localhost:8080/api`)
    pub fn new(base_url: &str, session: SessionStore) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Headers for the next request, with the bearer token when signed in
    pub fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.session.current_token()?;
        headers::build_headers(token.as_deref())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{} {}", method, url);
        Ok(self.client.request(method, url).headers(self.auth_headers()?))
    }

    // Authentication

    /// Sign in and persist the returned token and user id
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let response = self
            .request(Method::POST, "/auth/signin")?
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let auth: AuthResponse = response::decode(response).await?;
        self.session.save(&auth.access_token, auth.id)?;
        log::info!("Signed in as {} (id {})", auth.username, auth.id);
        Ok(auth)
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<MessageResponse> {
        let response = self
            .request(Method::POST, "/auth/signup")?
            .json(&SignupRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;

        response::decode(response).await
    }

    /// Tell the backend to revoke the current token
    pub async fn signout(&self) -> Result<()> {
        let response = self.request(Method::POST, "/auth/signout")?.send().await?;
        response::expect_success(response).await
    }

    // Users

    pub async fn profile(&self) -> Result<User> {
        let response = self.request(Method::GET, "/users/profile")?.send().await?;
        response::decode(response).await
    }

    pub async fn online_users(&self) -> Result<Vec<User>> {
        let response = self.request(Method::GET, "/users/online")?.send().await?;
        response::decode(response).await
    }

    /// `isOnline` is left out of the query when not given
    pub async fn update_status(
        &self,
        status: UserStatus,
        is_online: Option<bool>,
    ) -> Result<MessageResponse> {
        let mut query = vec![("status", status.as_str().to_string())];
        if let Some(is_online) = is_online {
            query.push(("isOnline", is_online.to_string()));
        }

        let response = self
            .request(Method::PUT, "/users/status")?
            .query(&query)
            .send()
            .await?;

        response::decode(response).await
    }

    /// Register the device's push-notification token
    pub async fn update_firebase_token(&self, token: &str) -> Result<MessageResponse> {
        let response = self
            .request(Method::PUT, "/users/firebase-token")?
            .query(&[("token", token)])
            .send()
            .await?;

        response::decode(response).await
    }

    // Channels

    pub async fn channels(&self) -> Result<Vec<Channel>> {
        let response = self.request(Method::GET, "/channels")?.send().await?;
        response::decode(response).await
    }

    pub async fn create_channel(&self, channel: &NewChannel) -> Result<Channel> {
        let response = self
            .request(Method::POST, "/channels")?
            .json(channel)
            .send()
            .await?;

        response::decode(response).await
    }

    pub async fn join_channel(&self, channel_id: i64) -> Result<MessageResponse> {
        let response = self
            .request(Method::POST, &format!("/channels/{}/join", channel_id))?
            .send()
            .await?;

        response::decode(response).await
    }

    // Messages

    /// Newest first, as the backend orders them
    pub async fn channel_messages(&self, channel_id: i64, page: PageRequest) -> Result<Page<Message>> {
        self.get_page(&format!("/messages/channel/{}", channel_id), page)
            .await
    }

    pub async fn send_channel_message(
        &self,
        channel_id: i64,
        message: &OutgoingMessage,
    ) -> Result<Message> {
        self.post_message(&format!("/messages/channel/{}", channel_id), message)
            .await
    }

    /// Conversation between the signed-in user and `user_id`, newest first
    pub async fn direct_messages(&self, user_id: i64, page: PageRequest) -> Result<Page<Message>> {
        self.get_page(&format!("/messages/direct/{}", user_id), page)
            .await
    }

    pub async fn send_direct_message(&self, user_id: i64, message: &OutgoingMessage) -> Result<Message> {
        self.post_message(&format!("/messages/direct/{}", user_id), message)
            .await
    }

    pub async fn thread_replies(&self, message_id: i64) -> Result<Vec<Message>> {
        let response = self
            .request(Method::GET, &format!("/messages/{}/replies", message_id))?
            .send()
            .await?;

        response::decode(response).await
    }

    async fn get_page(&self, path: &str, page: PageRequest) -> Result<Page<Message>> {
        let response = self
            .request(Method::GET, path)?
            .query(&[("page", page.page), ("size", page.size)])
            .send()
            .await?;

        response::decode(response).await
    }

    async fn post_message(&self, path: &str, message: &OutgoingMessage) -> Result<Message> {
        let response = self
            .request(Method::POST, path)?
            .json(message)
            .send()
            .await?;

        response::decode(response).await
    }

    // Session shortcuts

    pub fn is_authenticated(&self) -> Result<bool> {
        self.session.is_authenticated()
    }

    pub fn current_user_id(&self) -> Result<Option<i64>> {
        self.session.current_user_id()
    }
}
