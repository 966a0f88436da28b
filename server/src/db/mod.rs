/// Database layer for the development backend.
/// Handles users, bearer tokens, channels, memberships and messages in SQLite.

pub mod init;
pub mod models;

use chrono::{NaiveDateTime, Utc};
use models::{
    ChannelDto, ChannelRecord, MessageDto, MessageRecord, PageDto, ParentMessageDto, UserDto,
    UserRecord, MESSAGE_TYPES, USER_STATUSES,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub type DbPool = Arc<Mutex<Connection>>;

/// Failures surfaced to HTTP handlers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Error: Username is already taken!")]
    UsernameTaken,

    #[error("Error: Email is already in use!")]
    EmailTaken,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, Some(message)) = &err {
            if code.code == ErrorCode::ConstraintViolation {
                if message.contains("users.username") {
                    return StoreError::UsernameTaken;
                }
                if message.contains("users.email") {
                    return StoreError::EmailTaken;
                }
            }
        }
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Open (or create) the database at `db_path`, seeding the defaults when asked
///
/// `:memory:` gives a throwaway database.
pub fn create_pool(db_path: &Path, seed: bool) -> StoreResult<DbPool> {
    let mut conn = Connection::open(db_path)?;
    init::initialize_database(&conn)?;
    if seed {
        init::seed_defaults(&mut conn)?;
    }
    Ok(Arc::new(Mutex::new(conn)))
}

/// Create an empty in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    Arc::new(Mutex::new(conn))
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// SQLite LIMIT and OFFSET for a page request, clamped to what SQLite accepts
pub fn limit_offset(page: usize, size: usize) -> (i64, i64) {
    let limit = i64::try_from(size).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.saturating_mul(size)).unwrap_or(i64::MAX);
    (limit, offset)
}

const USER_COLUMNS: &str = "id, username, email, password, first_name, last_name, \
     profile_picture, status, is_online, last_seen, firebase_token, roles, created_at, updated_at";

const CHANNEL_COLUMNS: &str = "id, name, description, is_private, created_by, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, content, sender_id, channel_id, recipient_id, parent_id, \
     message_type, is_edited, edited_at, created_at, updated_at";

fn user_from_row(row: &Row) -> rusqlite::Result<UserRecord> {
    let roles: String = row.get(11)?;
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        profile_picture: row.get(6)?,
        status: row.get(7)?,
        is_online: row.get(8)?,
        last_seen: row.get(9)?,
        firebase_token: row.get(10)?,
        roles: roles
            .split(',')
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect(),
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn channel_from_row(row: &Row) -> rusqlite::Result<ChannelRecord> {
    Ok(ChannelRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_private: row.get(3)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn message_from_row(row: &Row) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        sender_id: row.get(2)?,
        channel_id: row.get(3)?,
        recipient_id: row.get(4)?,
        parent_id: row.get(5)?,
        message_type: row.get(6)?,
        is_edited: row.get(7)?,
        edited_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn find_user(conn: &Connection, user_id: i64) -> StoreResult<UserRecord> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![user_id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound("User not found".to_string()))
}

fn find_channel(conn: &Connection, channel_id: i64) -> StoreResult<ChannelRecord> {
    conn.query_row(
        &format!("SELECT {} FROM channels WHERE id = ?1", CHANNEL_COLUMNS),
        params![channel_id],
        channel_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound("Channel not found".to_string()))
}

fn find_message(conn: &Connection, message_id: i64) -> StoreResult<Option<MessageRecord>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS),
            params![message_id],
            message_from_row,
        )
        .optional()?)
}

fn is_member(conn: &Connection, channel_id: i64, user_id: i64) -> StoreResult<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM channel_members WHERE channel_id = ?1 AND user_id = ?2)",
        params![channel_id, user_id],
        |row| row.get(0),
    )?)
}

fn channel_dto(conn: &Connection, channel: &ChannelRecord) -> StoreResult<ChannelDto> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users
         WHERE id IN (SELECT user_id FROM channel_members WHERE channel_id = ?1)
         ORDER BY id",
        USER_COLUMNS
    ))?;
    let members = stmt
        .query_map(params![channel.id], user_from_row)?
        .map(|user| user.map(|u| UserDto::from(&u)))
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(ChannelDto {
        id: channel.id,
        name: channel.name.clone(),
        description: channel.description.clone(),
        is_private: channel.is_private,
        created_by: UserDto::from(&find_user(conn, channel.created_by)?),
        members,
        created_at: channel.created_at,
        updated_at: channel.updated_at,
    })
}

/// Replies to a message, oldest first
fn replies_of(conn: &Connection, parent_id: i64) -> StoreResult<Vec<MessageRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM messages WHERE parent_id = ?1 ORDER BY id",
        MESSAGE_COLUMNS
    ))?;
    let replies = stmt
        .query_map(params![parent_id], message_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(replies)
}

fn message_dto(conn: &Connection, message: &MessageRecord) -> StoreResult<MessageDto> {
    let channel = match message.channel_id {
        Some(id) => Some(channel_dto(conn, &find_channel(conn, id)?)?),
        None => None,
    };
    let recipient = match message.recipient_id {
        Some(id) => Some(UserDto::from(&find_user(conn, id)?)),
        None => None,
    };
    let parent_message = match message.parent_id {
        Some(id) => find_message(conn, id)?.map(|parent| ParentMessageDto {
            id: parent.id,
            content: parent.content,
        }),
        None => None,
    };
    let replies = replies_of(conn, message.id)?
        .iter()
        .map(|reply| message_dto(conn, reply))
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(MessageDto {
        id: message.id,
        content: message.content.clone(),
        sender: UserDto::from(&find_user(conn, message.sender_id)?),
        channel,
        recipient,
        parent_message,
        replies,
        message_type: message.message_type.clone(),
        is_edited: message.is_edited,
        edited_at: message.edited_at,
        created_at: message.created_at,
        updated_at: message.updated_at,
    })
}

/// One page of the messages matching `filter`, newest first
///
/// `filter` may use `?1`..`?n` for `args`.
fn message_page(
    conn: &Connection,
    filter: &str,
    args: &[&dyn ToSql],
    page: usize,
    size: usize,
) -> StoreResult<PageDto<MessageDto>> {
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM messages WHERE {}", filter),
        args,
        |row| row.get(0),
    )?;

    let (limit, offset) = limit_offset(page, size);
    let mut bound: Vec<&dyn ToSql> = args.to_vec();
    bound.push(&limit);
    bound.push(&offset);

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM messages WHERE {} ORDER BY id DESC LIMIT ?{} OFFSET ?{}",
        MESSAGE_COLUMNS,
        filter,
        args.len() + 1,
        args.len() + 2
    ))?;
    let records = stmt
        .query_map(bound.as_slice(), message_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let content = records
        .iter()
        .map(|m| message_dto(conn, m))
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(PageDto::new(content, usize::try_from(total).unwrap_or(0), page, size))
}

pub(crate) fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
    roles: &[&str],
) -> StoreResult<UserRecord> {
    let created_at = now();
    conn.execute(
        "INSERT INTO users (username, email, password, status, is_online, roles, created_at, updated_at)
         VALUES (?1, ?2, ?3, 'OFFLINE', 0, ?4, ?5, ?5)",
        params![username, email, password, roles.join(","), created_at],
    )?;
    find_user(conn, conn.last_insert_rowid())
}

/// Create a channel with its creator as the first member
pub(crate) fn insert_channel(
    conn: &mut Connection,
    creator_id: i64,
    name: &str,
    description: Option<&str>,
    is_private: bool,
) -> StoreResult<ChannelRecord> {
    find_user(conn, creator_id)?;
    let created_at = now();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO channels (name, description, is_private, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![name, description, is_private, creator_id, created_at],
    )?;
    let channel_id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO channel_members (channel_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
        params![channel_id, creator_id, created_at],
    )?;
    tx.commit()?;

    find_channel(conn, channel_id)
}

fn insert_message(
    conn: &Connection,
    sender_id: i64,
    channel_id: Option<i64>,
    recipient_id: Option<i64>,
    content: &str,
    message_type: Option<&str>,
    parent_id: Option<i64>,
) -> StoreResult<MessageDto> {
    if content.trim().is_empty() {
        return Err(StoreError::Rejected("Message content must not be blank".to_string()));
    }
    let message_type = message_type.unwrap_or("TEXT");
    if !MESSAGE_TYPES.contains(&message_type) {
        return Err(StoreError::Rejected(format!("Unknown message type: {}", message_type)));
    }
    if let Some(parent_id) = parent_id {
        if find_message(conn, parent_id)?.is_none() {
            return Err(StoreError::NotFound("Parent message not found".to_string()));
        }
    }

    let created_at = now();
    conn.execute(
        "INSERT INTO messages
            (content, sender_id, channel_id, recipient_id, parent_id, message_type, is_edited, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
        params![content, sender_id, channel_id, recipient_id, parent_id, message_type, created_at],
    )?;

    let message = find_message(conn, conn.last_insert_rowid())?
        .ok_or_else(|| StoreError::Database("Inserted message not found".to_string()))?;
    message_dto(conn, &message)
}

/// Database operations
pub struct Database;

impl Database {
    /// Register a new account
    pub async fn register_user(
        pool: &DbPool,
        username: &str,
        email: &str,
        password: &str,
    ) -> StoreResult<UserDto> {
        let conn = pool.lock().await;
        let user = insert_user(&conn, username, email, password, &["ROLE_USER"])?;
        Ok(UserDto::from(&user))
    }

    /// Check credentials and issue a fresh bearer token
    pub async fn sign_in(
        pool: &DbPool,
        username: &str,
        password: &str,
    ) -> StoreResult<(String, UserRecord)> {
        let conn = pool.lock().await;
        let user_id: i64 = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1 AND password = ?2",
                params![username, password],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::BadCredentials)?;

        let signed_in_at = now();
        conn.execute(
            "UPDATE users SET is_online = 1, status = 'ACTIVE', last_seen = ?2 WHERE id = ?1",
            params![user_id, signed_in_at],
        )?;

        let token = uuid::Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, signed_in_at],
        )?;

        Ok((token, find_user(&conn, user_id)?))
    }

    /// Revoke a token and mark its owner offline
    pub async fn sign_out(pool: &DbPool, token: &str) -> StoreResult<()> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;
        let user_id: i64 = tx
            .query_row(
                "SELECT user_id FROM tokens WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::Unauthorized)?;

        tx.execute("DELETE FROM tokens WHERE token = ?1", params![token])?;
        tx.execute(
            "UPDATE users SET is_online = 0, status = 'OFFLINE', last_seen = ?2 WHERE id = ?1",
            params![user_id, now()],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Resolve a bearer token to its user id
    pub async fn user_for_token(pool: &DbPool, token: &str) -> StoreResult<i64> {
        let conn = pool.lock().await;
        conn.query_row(
            "SELECT user_id FROM tokens WHERE token = ?1",
            params![token],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(StoreError::Unauthorized)
    }

    pub async fn get_user(pool: &DbPool, user_id: i64) -> StoreResult<UserDto> {
        let conn = pool.lock().await;
        Ok(UserDto::from(&find_user(&conn, user_id)?))
    }

    pub async fn online_users(pool: &DbPool) -> StoreResult<Vec<UserDto>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE is_online = 1 ORDER BY id",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .map(|user| user.map(|u| UserDto::from(&u)))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Set presence; `is_online` is left alone when not given
    pub async fn update_status(
        pool: &DbPool,
        user_id: i64,
        status: &str,
        is_online: Option<bool>,
    ) -> StoreResult<()> {
        if !USER_STATUSES.contains(&status) {
            return Err(StoreError::Rejected(format!("Unknown status: {}", status)));
        }
        let conn = pool.lock().await;
        let updated = conn.execute(
            "UPDATE users
             SET status = ?2, is_online = COALESCE(?3, is_online), last_seen = ?4, updated_at = ?4
             WHERE id = ?1",
            params![user_id, status, is_online, now()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    pub async fn update_firebase_token(pool: &DbPool, user_id: i64, token: &str) -> StoreResult<()> {
        let conn = pool.lock().await;
        let updated = conn.execute(
            "UPDATE users SET firebase_token = ?2 WHERE id = ?1",
            params![user_id, token],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Public channels plus private channels the user belongs to
    pub async fn accessible_channels(pool: &DbPool, user_id: i64) -> StoreResult<Vec<ChannelDto>> {
        let conn = pool.lock().await;
        find_user(&conn, user_id)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM channels
             WHERE is_private = 0
                OR id IN (SELECT channel_id FROM channel_members WHERE user_id = ?1)
             ORDER BY id",
            CHANNEL_COLUMNS
        ))?;
        let channels = stmt
            .query_map(params![user_id], channel_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        channels.iter().map(|c| channel_dto(&conn, c)).collect()
    }

    pub async fn create_channel(
        pool: &DbPool,
        user_id: i64,
        name: &str,
        description: Option<String>,
        is_private: bool,
    ) -> StoreResult<ChannelDto> {
        if name.trim().is_empty() {
            return Err(StoreError::Rejected("Channel name must not be blank".to_string()));
        }
        let mut conn = pool.lock().await;
        let channel = insert_channel(&mut conn, user_id, name, description.as_deref(), is_private)?;
        channel_dto(&conn, &channel)
    }

    pub async fn join_channel(pool: &DbPool, user_id: i64, channel_id: i64) -> StoreResult<()> {
        let conn = pool.lock().await;
        find_user(&conn, user_id)?;
        let channel = find_channel(&conn, channel_id)?;

        let is_member = is_member(&conn, channel_id, user_id)?;
        if channel.is_private && !is_member {
            return Err(StoreError::Rejected("Cannot join private channel!".to_string()));
        }
        if !is_member {
            let joined_at = now();
            conn.execute(
                "INSERT INTO channel_members (channel_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
                params![channel_id, user_id, joined_at],
            )?;
            conn.execute(
                "UPDATE channels SET updated_at = ?2 WHERE id = ?1",
                params![channel_id, joined_at],
            )?;
        }
        Ok(())
    }

    pub async fn channel_messages(
        pool: &DbPool,
        channel_id: i64,
        page: usize,
        size: usize,
    ) -> StoreResult<PageDto<MessageDto>> {
        let conn = pool.lock().await;
        find_channel(&conn, channel_id)?;
        message_page(&conn, "channel_id = ?1", &[&channel_id], page, size)
    }

    /// Conversation between two users in either direction
    pub async fn direct_messages(
        pool: &DbPool,
        user_id: i64,
        other_id: i64,
        page: usize,
        size: usize,
    ) -> StoreResult<PageDto<MessageDto>> {
        let conn = pool.lock().await;
        find_user(&conn, user_id)?;
        find_user(&conn, other_id)?;
        message_page(
            &conn,
            "recipient_id IS NOT NULL
             AND ((sender_id = ?1 AND recipient_id = ?2) OR (sender_id = ?2 AND recipient_id = ?1))",
            &[&user_id, &other_id],
            page,
            size,
        )
    }

    /// Post to a channel; only members may post
    pub async fn post_channel_message(
        pool: &DbPool,
        sender_id: i64,
        channel_id: i64,
        content: &str,
        message_type: Option<&str>,
        parent_id: Option<i64>,
    ) -> StoreResult<MessageDto> {
        let conn = pool.lock().await;
        find_user(&conn, sender_id)?;
        find_channel(&conn, channel_id)?;
        if !is_member(&conn, channel_id, sender_id)? {
            return Err(StoreError::Rejected("Not a member of this channel".to_string()));
        }
        insert_message(&conn, sender_id, Some(channel_id), None, content, message_type, parent_id)
    }

    pub async fn post_direct_message(
        pool: &DbPool,
        sender_id: i64,
        recipient_id: i64,
        content: &str,
        message_type: Option<&str>,
        parent_id: Option<i64>,
    ) -> StoreResult<MessageDto> {
        let conn = pool.lock().await;
        find_user(&conn, sender_id)?;
        find_user(&conn, recipient_id)?;
        insert_message(&conn, sender_id, None, Some(recipient_id), content, message_type, parent_id)
    }

    /// Replies to a message, oldest first
    pub async fn thread_replies(pool: &DbPool, message_id: i64) -> StoreResult<Vec<MessageDto>> {
        let conn = pool.lock().await;
        replies_of(&conn, message_id)?
            .iter()
            .map(|m| message_dto(&conn, m))
            .collect()
    }
}
