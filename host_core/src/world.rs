//! Host persistence and lookup boundary
//!
//! Every asynchronous suspension point the module has — document updates,
//! flag mutation, video thumbnail generation, chat creation — goes through
//! [`HostWorld`]. [`MemoryWorld`] is the in-memory implementation used by
//! tests and demos.

use crate::actor::{Actor, HpUpdate, TokenDocument};
use crate::chat::{ChatMessage, User};
use crate::HostError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Whether an image path points at a video asset needing a thumbnail
pub fn has_video_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    ["webm", "mp4", "m4v", "ogv"]
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// The host's in-memory document API
#[async_trait]
pub trait HostWorld: Send + Sync {
    /// Snapshot of an actor by uuid
    fn actor(&self, uuid: &str) -> Option<Actor>;

    /// Snapshot of a token document by uuid
    fn token(&self, uuid: &str) -> Option<TokenDocument>;

    /// The user roster
    fn users(&self) -> Vec<User>;

    /// The user this client is signed in as, when known
    fn current_user(&self) -> Option<User> {
        None
    }

    /// Persist an HP update against an actor, returning the updated record
    async fn update_actor(&self, uuid: &str, update: &HpUpdate) -> Result<Actor, HostError>;

    /// Remove a scoped flag from a token document
    async fn unset_token_flag(
        &self,
        token_uuid: &str,
        scope: &str,
        key: &str,
    ) -> Result<(), HostError>;

    /// Generate a still thumbnail for a video asset
    async fn create_thumbnail(
        &self,
        img: &str,
        width: u32,
        height: u32,
    ) -> Result<String, HostError>;

    /// Post a chat message
    async fn post_chat(&self, message: ChatMessage) -> Result<(), HostError>;
}

/// In-memory [`HostWorld`] for tests
#[derive(Default)]
pub struct MemoryWorld {
    actors: Mutex<HashMap<String, Actor>>,
    tokens: Mutex<HashMap<String, TokenDocument>>,
    users: Mutex<Vec<User>>,
    current_user: Mutex<Option<User>>,
    chat: Mutex<Vec<ChatMessage>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        MemoryWorld::default()
    }

    pub fn insert_actor(&self, actor: Actor) {
        let mut actors = self.actors.lock().unwrap_or_else(|e| e.into_inner());
        actors.insert(actor.uuid.clone(), actor);
    }

    pub fn insert_token(&self, token: TokenDocument) {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.insert(token.uuid.clone(), token);
    }

    pub fn insert_user(&self, user: User) {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users.push(user);
    }

    pub fn sign_in(&self, user: User) {
        let mut current = self.current_user.lock().unwrap_or_else(|e| e.into_inner());
        *current = Some(user);
    }

    /// Make subsequent updates for this actor fail (persistence fault
    /// injection)
    pub fn fail_updates_for(&self, uuid: &str) {
        let mut failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        failing.insert(uuid.to_string());
    }

    /// Messages posted so far
    pub fn messages(&self) -> Vec<ChatMessage> {
        let chat = self.chat.lock().unwrap_or_else(|e| e.into_inner());
        chat.clone()
    }
}

#[async_trait]
impl HostWorld for MemoryWorld {
    fn actor(&self, uuid: &str) -> Option<Actor> {
        let actors = self.actors.lock().unwrap_or_else(|e| e.into_inner());
        actors.get(uuid).cloned()
    }

    fn token(&self, uuid: &str) -> Option<TokenDocument> {
        let tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.get(uuid).cloned()
    }

    fn users(&self) -> Vec<User> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users.clone()
    }

    fn current_user(&self) -> Option<User> {
        let current = self.current_user.lock().unwrap_or_else(|e| e.into_inner());
        current.clone()
    }

    async fn update_actor(&self, uuid: &str, update: &HpUpdate) -> Result<Actor, HostError> {
        {
            let failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
            if failing.contains(uuid) {
                return Err(HostError::UpdateFailed {
                    uuid: uuid.to_string(),
                    message: "injected failure".to_string(),
                });
            }
        }

        let mut actors = self.actors.lock().unwrap_or_else(|e| e.into_inner());
        let actor = actors
            .get_mut(uuid)
            .ok_or_else(|| HostError::MissingActor(uuid.to_string()))?;
        actor.hp.temp = Some(update.temp);
        actor.hp.value = update.value;
        if let Some(applied) = update.damage_applied {
            actor.set_flag("dae", "damageApplied", serde_json::json!(applied));
        }
        Ok(actor.clone())
    }

    async fn unset_token_flag(
        &self,
        token_uuid: &str,
        scope: &str,
        key: &str,
    ) -> Result<(), HostError> {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        let token = tokens
            .get_mut(token_uuid)
            .ok_or_else(|| HostError::MissingToken(token_uuid.to_string()))?;
        token.flags.remove(&format!("{}.{}", scope, key));
        Ok(())
    }

    async fn create_thumbnail(
        &self,
        img: &str,
        width: u32,
        height: u32,
    ) -> Result<String, HostError> {
        Ok(format!("{}#thumb-{}x{}", img, width, height))
    }

    async fn post_chat(&self, message: ChatMessage) -> Result<(), HostError> {
        let mut chat = self.chat.lock().unwrap_or_else(|e| e.into_inner());
        chat.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorKind;

    #[test]
    fn test_video_extension_probe() {
        assert!(has_video_extension("tokens/ogre.webm"));
        assert!(has_video_extension("tokens/OGRE.MP4"));
        assert!(!has_video_extension("tokens/ogre.webp"));
        assert!(!has_video_extension("tokens/ogre"));
    }

    #[tokio::test]
    async fn test_update_applies_hp_and_undo_flag() {
        let world = MemoryWorld::new();
        let mut actor = Actor::new("Actor.a1", "Mara", ActorKind::Character);
        actor.hp = crate::actor::HpAttributes::new(10, 20);
        world.insert_actor(actor);

        let updated = world
            .update_actor(
                "Actor.a1",
                &HpUpdate {
                    temp: 2,
                    value: 7,
                    damage_applied: Some(3),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.hp.value, 7);
        assert_eq!(updated.hp.temp(), 2);
        assert_eq!(
            updated.flag("dae", "damageApplied"),
            Some(&serde_json::json!(3))
        );
    }

    #[tokio::test]
    async fn test_injected_update_failure() {
        let world = MemoryWorld::new();
        world.insert_actor(Actor::new("Actor.a1", "Mara", ActorKind::Character));
        world.fail_updates_for("Actor.a1");

        let result = world
            .update_actor(
                "Actor.a1",
                &HpUpdate {
                    temp: 0,
                    value: 0,
                    damage_applied: None,
                },
            )
            .await;
        assert!(matches!(result, Err(HostError::UpdateFailed { .. })));
    }

    #[tokio::test]
    async fn test_unset_token_flag() {
        let world = MemoryWorld::new();
        let mut token = TokenDocument {
            id: "t1".to_string(),
            uuid: "Scene.s.Token.t1".to_string(),
            name: "Ogre".to_string(),
            img: None,
            actor_uuid: "Actor.a1".to_string(),
            scene_id: None,
            flags: HashMap::new(),
        };
        token.set_flag("evasion-class", "reduced", serde_json::json!(true));
        world.insert_token(token);

        world
            .unset_token_flag("Scene.s.Token.t1", "evasion-class", "reduced")
            .await
            .unwrap();
        let token = world.token("Scene.s.Token.t1").unwrap();
        assert!(token.flag("evasion-class", "reduced").is_none());
    }
}
