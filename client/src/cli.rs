//! CLI interface for the DevSync client
//!
//! Subcommand definitions, one-line output formatting, and dispatch onto the
//! session controller and services.

use crate::controller::{AuthPhase, SessionController};
use crate::error::{ClientError, Result};
use crate::models::{ChannelView, MessageView, PageRequest, User, UserStatus, DEFAULT_PAGE_SIZE};
use crate::services::{ChannelService, MessageService};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login { username: String, password: String },
    /// Create an account (does not sign in)
    Signup {
        username: String,
        email: String,
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Set presence status (ACTIVE, AWAY, DO_NOT_DISTURB, OFFLINE)
    Status {
        status: UserStatus,
        #[arg(long, conflicts_with = "offline")]
        online: bool,
        #[arg(long)]
        offline: bool,
    },
    /// List users currently online
    Online,
    /// Register a push-notification token
    FirebaseToken { token: String },
    #[command(subcommand)]
    Channels(ChannelCommand),
    #[command(subcommand)]
    Messages(MessageCommand),
}

#[derive(Debug, Subcommand)]
pub enum ChannelCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        private: bool,
    },
    Join { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum MessageCommand {
    /// Show a page of a channel's history, oldest first
    Channel {
        id: i64,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,
    },
    /// Show a page of a direct conversation, oldest first
    Direct {
        user_id: i64,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,
    },
    SendChannel {
        id: i64,
        content: String,
        #[arg(long)]
        reply_to: Option<i64>,
    },
    SendDirect {
        user_id: i64,
        content: String,
        #[arg(long)]
        reply_to: Option<i64>,
    },
    /// Show a thread's replies
    Replies { message_id: i64 },
}

impl Command {
    /// Whether the stored session should be validated before running
    fn needs_session(&self) -> bool {
        !matches!(self, Command::Login { .. } | Command::Signup { .. } | Command::Logout)
    }
}

/// Format a user for display
pub fn format_user(user: &User) -> String {
    let presence = if user.is_online { "online" } else { "offline" };
    let name = user.display_name();
    if name == user.username {
        format!("#{} {} {} {}", user.id, user.username, user.status, presence)
    } else {
        format!(
            "#{} {} ({}) {} {}",
            user.id, user.username, name, user.status, presence
        )
    }
}

/// Format a channel list entry for display
pub fn format_channel(view: &ChannelView) -> String {
    let visibility = if view.channel.is_private {
        " [private]"
    } else {
        ""
    };
    format!(
        "#{} {}{} - {} ({})",
        view.channel.id, view.channel.name, visibility, view.last_message, view.timestamp
    )
}

/// Format a message for display
pub fn format_message(view: &MessageView) -> String {
    let author = if view.is_current_user {
        "you".to_string()
    } else {
        view.message.sender.username.clone()
    };
    let mut line = format!(
        "[{}] {} <{}> {}",
        view.timestamp, view.message.id, author, view.message.content
    );
    if let Some(parent_id) = view.message.parent_id {
        line.push_str(&format!(" (reply to {})", parent_id));
    }
    if !view.message.replies.is_empty() {
        line.push_str(&format!(" [{} replies]", view.message.replies.len()));
    }
    line
}

fn is_online_flag(online: bool, offline: bool) -> Option<bool> {
    match (online, offline) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Execute one command, printing results to stdout
pub async fn run(command: Command, controller: &SessionController) -> Result<()> {
    if command.needs_session() {
        controller.restore().await?;
    }

    let channels = ChannelService::new(controller.api().clone());
    let messages = MessageService::new(controller.api().clone());

    match command {
        Command::Login { username, password } => {
            let user = controller.login(&username, &password).await?;
            println!("Signed in as {}", format_user(&user));
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            let response = controller.signup(&username, &email, &password).await?;
            println!("{}", response.message);
        }
        Command::Logout => {
            controller.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match controller.state().phase() {
            AuthPhase::Authenticated => {
                if let Some(user) = controller.current_user() {
                    println!("{}", format_user(&user));
                }
            }
            _ => return Err(ClientError::NotAuthenticated),
        },
        Command::Status {
            status,
            online,
            offline,
        } => {
            controller
                .update_user_status(status, is_online_flag(online, offline))
                .await?;
            if let Some(user) = controller.current_user() {
                println!("{}", format_user(&user));
            }
        }
        Command::Online => {
            for user in controller.api().online_users().await? {
                println!("{}", format_user(&user));
            }
        }
        Command::FirebaseToken { token } => {
            let response = controller.api().update_firebase_token(&token).await?;
            println!("{}", response.message);
        }
        Command::Channels(ChannelCommand::List) => {
            for view in channels.user_channels().await? {
                println!("{}", format_channel(&view));
            }
        }
        Command::Channels(ChannelCommand::Create {
            name,
            description,
            private,
        }) => {
            let channel = channels
                .create_channel(&name, description.as_deref(), private)
                .await?;
            println!("Created channel #{} {}", channel.id, channel.name);
        }
        Command::Channels(ChannelCommand::Join { id }) => {
            let response = channels.join_channel(id).await?;
            println!("{}", response.message);
        }
        Command::Messages(MessageCommand::Channel { id, page, size }) => {
            for view in messages
                .channel_messages(id, PageRequest::new(page, size))
                .await?
            {
                println!("{}", format_message(&view));
            }
        }
        Command::Messages(MessageCommand::Direct {
            user_id,
            page,
            size,
        }) => {
            for view in messages
                .direct_messages(user_id, PageRequest::new(page, size))
                .await?
            {
                println!("{}", format_message(&view));
            }
        }
        Command::Messages(MessageCommand::SendChannel {
            id,
            content,
            reply_to,
        }) => {
            let view = messages.send_channel_message(id, &content, reply_to).await?;
            println!("{}", format_message(&view));
        }
        Command::Messages(MessageCommand::SendDirect {
            user_id,
            content,
            reply_to,
        }) => {
            let view = messages
                .send_direct_message(user_id, &content, reply_to)
                .await?;
            println!("{}", format_message(&view));
        }
        Command::Messages(MessageCommand::Replies { message_id }) => {
            for view in messages.thread_replies(message_id).await? {
                println!("{}", format_message(&view));
            }
        }
    }

    Ok(())
}
