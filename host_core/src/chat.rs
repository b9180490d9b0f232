//! Chat message payloads and the user roster

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host user roles relevant to whisper routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Player,
    Gamemaster,
}

/// A connected (or known) host user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub active: bool,
}

/// Attribution block for a chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub user: Option<String>,
}

/// Host-owned chat message payload
///
/// `flags` carries module metadata; the reverse-damage card attaches its
/// undo list there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub speaker: Speaker,
    pub content: String,
    /// Recipient user ids; empty means public
    #[serde(default)]
    pub whisper: Vec<String>,
    #[serde(default)]
    pub flags: HashMap<String, serde_json::Value>,
}

/// Ids of active users holding the gamemaster role
pub fn gamemaster_recipients(users: &[User]) -> Vec<String> {
    users
        .iter()
        .filter(|u| u.role == UserRole::Gamemaster && u.active)
        .map(|u| u.id.clone())
        .collect()
}
