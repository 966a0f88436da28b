/// HTTP server factory and configuration.
/// Provides a reusable function to create and configure the HTTP server
/// for use in both the main binary and tests.

use crate::db::DbPool;
use crate::handlers::{
    channel_messages, create_channel, direct_messages, get_channels, health, join_channel,
    online_users, profile, send_channel_message, send_direct_message, signin, signout, signup,
    thread_replies, update_firebase_token, update_status,
};
use actix_web::{middleware, web, App, HttpServer};

/// Register every endpoint under `/api`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            // Authentication
            .route("/auth/signin", web::post().to(signin))
            .route("/auth/signup", web::post().to(signup))
            .route("/auth/signout", web::post().to(signout))
            // Users
            .route("/users/profile", web::get().to(profile))
            .route("/users/online", web::get().to(online_users))
            .route("/users/status", web::put().to(update_status))
            .route("/users/firebase-token", web::put().to(update_firebase_token))
            // Channels
            .route("/channels", web::get().to(get_channels))
            .route("/channels", web::post().to(create_channel))
            .route("/channels/{id}/join", web::post().to(join_channel))
            // Messages
            .route("/messages/channel/{id}", web::get().to(channel_messages))
            .route("/messages/channel/{id}", web::post().to(send_channel_message))
            .route("/messages/direct/{user_id}", web::get().to(direct_messages))
            .route("/messages/direct/{user_id}", web::post().to(send_direct_message))
            .route("/messages/{id}/replies", web::get().to(thread_replies)),
    );
}

/// Create a configured HTTP server
///
/// # Arguments
/// * `pool` - Database pool wrapped in web::Data
/// * `bind_addr` - Address to bind the server to (e.g., "127.0.0.1:8080")
pub fn create_http_server(
    pool: web::Data<DbPool>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server backed by an empty store
///
/// Binds to a random available port on 127.0.0.1.
///
/// # Returns
/// A tuple of (server, bind_address); the client base URL is
/// `http://{bind_address}/api`.
///
/// # Example
/// ```ignore
/// let (server, addr) = server::create_test_http_server()?;
/// tokio::spawn(server);
/// let resp = reqwest::get(format!("http://{}/api/health", addr)).await?;
/// ```
#[cfg(any(test, feature = "test_utils"))]
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    let pool = web::Data::new(crate::db::create_test_pool());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .workers(1)
    .bind("127.0.0.1:0")?;

    // Get the actual bind address (including the assigned port)
    let addr_str = server
        .addrs()
        .first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No bind address found"))?
        .to_string();

    Ok((server.run(), addr_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_create_http_server_invalid_address() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let result = create_http_server(pool, "invalid_address:99999");
        assert!(result.is_err(), "create_http_server should fail with invalid address");
    }

    #[tokio::test]
    async fn test_create_test_http_server() {
        let (_server, addr) = create_test_http_server().expect("server creation should succeed");
        assert!(addr.contains("127.0.0.1:"), "Address should contain 127.0.0.1:");
        let port_part = addr.split(':').nth(1).unwrap_or("");
        assert!(!port_part.is_empty(), "Port should be assigned");
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let app = test::init_service(App::new().app_data(pool).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_signup_then_signin() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let app = test::init_service(App::new().app_data(pool).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({"username": "bob", "email": "b@x.com", "password": "secret1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::post()
            .uri("/api/auth/signin")
            .set_json(json!({"username": "bob", "password": "secret1"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["username"], "bob");
        assert_eq!(body["tokenType"], "Bearer");
        assert!(body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["roles"], json!(["ROLE_USER"]));
    }

    #[actix_web::test]
    async fn test_wrong_password_is_bad_request() {
        let pool = web::Data::new(crate::db::create_test_pool());
        crate::db::Database::register_user(&pool, "bob", "b@x.com", "secret1")
            .await
            .unwrap();
        let app = test::init_service(App::new().app_data(pool).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/signin")
            .set_json(json!({"username": "bob", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Bad credentials");
    }

    #[actix_web::test]
    async fn test_profile_requires_bearer_token() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let app = test::init_service(App::new().app_data(pool).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/users/profile").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = test::TestRequest::get()
            .uri("/api/users/profile")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_profile_with_token() {
        let pool = web::Data::new(crate::db::create_test_pool());
        crate::db::Database::register_user(&pool, "carol", "c@x.com", "secret1")
            .await
            .unwrap();
        let (token, _) = crate::db::Database::sign_in(&pool, "carol", "secret1")
            .await
            .unwrap();
        let app = test::init_service(App::new().app_data(pool).configure(routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/users/profile")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["username"], "carol");
        assert_eq!(body["isOnline"], true);
        assert_eq!(body["status"], "ACTIVE");
        assert!(body.get("password").is_none());
    }

    #[actix_web::test]
    async fn test_page_number_past_the_end() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let dave = crate::db::Database::register_user(&pool, "dave", "d@x.com", "secret1")
            .await
            .unwrap();
        let channel = crate::db::Database::create_channel(&pool, dave.id, "dev", None, false)
            .await
            .unwrap();
        let (token, _) = crate::db::Database::sign_in(&pool, "dave", "secret1")
            .await
            .unwrap();
        let app = test::init_service(App::new().app_data(pool).configure(routes)).await;

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/messages/channel/{}?page={}&size=20",
                channel.id,
                usize::MAX
            ))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["content"], json!([]));
        assert_eq!(body["last"], true);
    }
}
