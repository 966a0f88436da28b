/// Database initialization and schema setup.
/// Optionally seeds an admin account and a public `general` channel.
use super::{insert_channel, insert_user, StoreResult};
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_CHANNEL: &str = "general";

/// Initialize the database connection with pragmas and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // WAL has no effect on in-memory databases; ignore failures
    let _ = conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
    conn.pragma_update(None, "foreign_keys", true)?;

    create_schema(conn)?;
    Ok(())
}

/// Create database schema
fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            first_name TEXT,
            last_name TEXT,
            profile_picture TEXT,
            status TEXT NOT NULL DEFAULT 'OFFLINE',
            is_online INTEGER NOT NULL DEFAULT 0,
            last_seen TEXT,
            firebase_token TEXT,
            roles TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tokens (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS channels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            is_private INTEGER NOT NULL DEFAULT 0,
            created_by INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS channel_members (
            channel_id INTEGER NOT NULL REFERENCES channels(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            joined_at TEXT NOT NULL,
            PRIMARY KEY (channel_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            sender_id INTEGER NOT NULL REFERENCES users(id),
            channel_id INTEGER REFERENCES channels(id),
            recipient_id INTEGER REFERENCES users(id),
            parent_id INTEGER REFERENCES messages(id),
            message_type TEXT NOT NULL DEFAULT 'TEXT',
            is_edited INTEGER NOT NULL DEFAULT 0,
            edited_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK ((channel_id IS NULL) != (recipient_id IS NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
        CREATE INDEX IF NOT EXISTS idx_members_user ON channel_members(user_id);
        CREATE INDEX IF NOT EXISTS idx_messages_channel ON messages(channel_id, id);
        CREATE INDEX IF NOT EXISTS idx_messages_direct ON messages(sender_id, recipient_id, id);
        CREATE INDEX IF NOT EXISTS idx_messages_parent ON messages(parent_id, id);
        "#,
    )?;

    Ok(())
}

/// Seed the admin account and `general` channel unless they already exist
pub fn seed_defaults(conn: &mut Connection) -> StoreResult<()> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM users WHERE username = ?1",
            [ADMIN_USERNAME],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        log::debug!("Default data already present");
        return Ok(());
    }

    let admin = insert_user(
        conn,
        ADMIN_USERNAME,
        "admin@devsync.local",
        ADMIN_PASSWORD,
        &["ROLE_USER", "ROLE_ADMIN"],
    )?;
    insert_channel(
        conn,
        admin.id,
        DEFAULT_CHANNEL,
        Some("Company-wide announcements and chatter"),
        false,
    )?;

    log::info!("Seeded '{}' account and '{}' channel", ADMIN_USERNAME, DEFAULT_CHANNEL);
    Ok(())
}
