/// User model for the DevSync client.
/// A snapshot of an account as last returned by the backend.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Presence status a user advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Away,
    DoNotDisturb,
    #[default]
    Offline,
}

impl UserStatus {
    /// Wire name, as used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Away => "AWAY",
            UserStatus::DoNotDisturb => "DO_NOT_DISTURB",
            UserStatus::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ACTIVE" => Ok(UserStatus::Active),
            "AWAY" => Ok(UserStatus::Away),
            "DO_NOT_DISTURB" | "DND" => Ok(UserStatus::DoNotDisturb),
            "OFFLINE" => Ok(UserStatus::Offline),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub is_online: bool,
    pub last_seen: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Full name when the profile has one, otherwise the username
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Single uppercase letter used as a placeholder avatar
    pub fn avatar_initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 7,
            "username": "bob",
            "email": "b@x.com",
            "firstName": "Bob",
            "status": "DO_NOT_DISTURB",
            "isOnline": true,
            "lastSeen": null,
            "createdAt": "2024-05-01T09:30:00",
            "updatedAt": "2024-05-01T09:30:00.123456"
        }"#
    }

    #[test]
    fn test_user_deserialization() {
        let user: User = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.status, UserStatus::DoNotDisturb);
        assert!(user.is_online);
        assert_eq!(user.last_name, None);
        assert!(user.last_seen.is_none());
    }

    #[test]
    fn test_display_name() {
        let mut user: User = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(user.display_name(), "Bob");
        user.last_name = Some("Builder".to_string());
        assert_eq!(user.display_name(), "Bob Builder");
        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.display_name(), "bob");
    }

    #[test]
    fn test_avatar_initial() {
        let user: User = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(user.avatar_initial(), "B");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("away".parse::<UserStatus>(), Ok(UserStatus::Away));
        assert_eq!("do-not-disturb".parse::<UserStatus>(), Ok(UserStatus::DoNotDisturb));
        assert_eq!("DND".parse::<UserStatus>(), Ok(UserStatus::DoNotDisturb));
        assert!("busy".parse::<UserStatus>().is_err());
        assert_eq!(UserStatus::DoNotDisturb.to_string(), "DO_NOT_DISTURB");
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&UserStatus::DoNotDisturb).unwrap();
        assert_eq!(json, "\"DO_NOT_DISTURB\"");
    }
}
