/// REST API handlers for HTTP endpoints.
/// Handles authentication, users, channels and messages.

use super::auth::{authenticate, bearer_token};
use crate::db::models::*;
use crate::db::{Database, DbPool, StoreError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

type HandlerResult = Result<HttpResponse, StoreError>;

/// POST /api/auth/signin
pub async fn signin(pool: web::Data<DbPool>, req: web::Json<SigninRequest>) -> HandlerResult {
    let (token, user) = Database::sign_in(&pool, &req.username, &req.password)
        .await
        .inspect_err(|_| log::info!("Rejected sign-in for {}", req.username))?;

    log::info!("User {} signed in", user.username);
    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        id: user.id,
        username: user.username,
        email: user.email,
        roles: user.roles,
    }))
}

/// POST /api/auth/signup
pub async fn signup(pool: web::Data<DbPool>, req: web::Json<SignupRequest>) -> HandlerResult {
    let user = Database::register_user(&pool, &req.username, &req.email, &req.password).await?;
    log::info!("Registered user {} (id {})", user.username, user.id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("User registered successfully!")))
}

/// POST /api/auth/signout
pub async fn signout(pool: web::Data<DbPool>, req: HttpRequest) -> HandlerResult {
    let token = bearer_token(&req).ok_or(StoreError::Unauthorized)?;
    Database::sign_out(&pool, token).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Log out successful!")))
}

/// GET /api/users/profile
pub async fn profile(pool: web::Data<DbPool>, req: HttpRequest) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    let user = Database::get_user(&pool, user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /api/users/online
pub async fn online_users(pool: web::Data<DbPool>, req: HttpRequest) -> HandlerResult {
    authenticate(&req, &pool).await?;
    let users = Database::online_users(&pool).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// PUT /api/users/status?status=&isOnline=
pub async fn update_status(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    query: web::Query<StatusQuery>,
) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    Database::update_status(&pool, user_id, &query.status, query.is_online).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Status updated successfully!")))
}

/// PUT /api/users/firebase-token?token=
pub async fn update_firebase_token(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    query: web::Query<TokenQuery>,
) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    Database::update_firebase_token(&pool, user_id, &query.token).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Firebase token updated successfully!")))
}

/// GET /api/channels
pub async fn get_channels(pool: web::Data<DbPool>, req: HttpRequest) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    let channels = Database::accessible_channels(&pool, user_id).await?;
    Ok(HttpResponse::Ok().json(channels))
}

/// POST /api/channels
pub async fn create_channel(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    body: web::Json<ChannelRequest>,
) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    let body = body.into_inner();
    let channel =
        Database::create_channel(&pool, user_id, &body.name, body.description, body.is_private)
            .await?;
    log::info!("Channel #{} created by user {}", channel.name, user_id);
    Ok(HttpResponse::Ok().json(channel))
}

/// POST /api/channels/{id}/join
pub async fn join_channel(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    channel_id: web::Path<i64>,
) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    Database::join_channel(&pool, user_id, *channel_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Joined channel successfully!")))
}

/// GET /api/messages/channel/{id}?page=&size=
pub async fn channel_messages(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    channel_id: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> HandlerResult {
    authenticate(&req, &pool).await?;
    let page = Database::channel_messages(&pool, *channel_id, query.page(), query.size()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/messages/channel/{id}
pub async fn send_channel_message(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    channel_id: web::Path<i64>,
    body: web::Json<MessageRequest>,
) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    let message = Database::post_channel_message(
        &pool,
        user_id,
        *channel_id,
        &body.content,
        body.message_type.as_deref(),
        body.parent_message_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(message))
}

/// GET /api/messages/direct/{userId}?page=&size=
pub async fn direct_messages(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    other_id: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    let page =
        Database::direct_messages(&pool, user_id, *other_id, query.page(), query.size()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/messages/direct/{userId}
pub async fn send_direct_message(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    recipient_id: web::Path<i64>,
    body: web::Json<MessageRequest>,
) -> HandlerResult {
    let user_id = authenticate(&req, &pool).await?;
    let message = Database::post_direct_message(
        &pool,
        user_id,
        *recipient_id,
        &body.content,
        body.message_type.as_deref(),
        body.parent_message_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(message))
}

/// GET /api/messages/{id}/replies
pub async fn thread_replies(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    message_id: web::Path<i64>,
) -> HandlerResult {
    authenticate(&req, &pool).await?;
    let replies = Database::thread_replies(&pool, *message_id).await?;
    Ok(HttpResponse::Ok().json(replies))
}

/// Health check endpoint
/// GET /api/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok"
    }))
}
