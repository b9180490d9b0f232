//! Reverse damage card
//!
//! The combat-automation add-on computes damage for a batch of tokens, then
//! hands the list to this builder through its function registry. Each entry
//! is recomputed under the extended negative-HP rule, optionally put through
//! the evasion reduction, persisted when the caller's mode asks for it, and
//! summarised on a chat card whispered to active gamemasters with an undo
//! payload attached.
//!
//! Per-token persistence requests run concurrently and are joined once at
//! the end; one token's failure never blocks the others, and the card posts
//! only after all have settled.

use crate::reduction::{self, ReductionRule, EVASION_MODULE, RATING_FLAG, REDUCED_FLAG};
use crate::settings;
use crate::{AUTOMATION_MODULE, MODULE_ID};
use async_trait::async_trait;
use host_core::actor::damage_type_label;
use host_core::{
    clamped, gamemaster_recipients, has_video_extension, Actor, ActorKind, BridgeHandler,
    ChatMessage, HostError, HostWorld, HpUpdate, ModuleRegistry, SettingsStore, Speaker,
    TokenDocument, TraitKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// The automation add-on's auto-apply mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoApply {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "yesCard")]
    YesCard,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "noCard")]
    NoCard,
}

impl AutoApply {
    /// Whether this mode persists HP updates
    pub fn applies(&self) -> bool {
        matches!(self, AutoApply::Yes | AutoApply::YesCard)
    }

    /// Whether this mode posts a chat card
    pub fn wants_card(&self) -> bool {
        matches!(self, AutoApply::YesCard | AutoApply::NoCard)
    }
}

/// One precomputed damage entry from the automation add-on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageListEntry {
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub token_uuid: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub actor_uuid: Option<String>,
    #[serde(rename = "oldHP")]
    pub old_hp: i32,
    #[serde(rename = "oldTempHP")]
    pub old_temp_hp: i32,
    #[serde(rename = "newTempHP")]
    pub new_temp_hp: i32,
    #[serde(default)]
    pub temp_damage: i32,
    #[serde(default)]
    pub hp_damage: i32,
    pub total_damage: f64,
    pub applied_damage: f64,
    #[serde(default)]
    pub scene_id: Option<String>,
}

/// The batch payload the automation add-on sends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageCardData {
    #[serde(default)]
    pub damage_list: Vec<DamageListEntry>,
    pub auto_apply_damage: AutoApply,
}

/// Automation add-on display preferences this builder honors
#[derive(Debug, Clone, Copy, Default)]
pub struct AutomationConfig {
    /// Prefer the actor portrait over token art for player characters
    pub use_player_portrait: bool,
    /// Prefer token names over actor names
    pub use_token_names: bool,
}

/// One rendered row of the damage card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLine {
    pub actor_uuid: String,
    pub token_id: String,
    pub display_uuid: String,
    #[serde(default)]
    pub token_uuid: Option<String>,
    pub token_img: String,
    pub token_name: String,
    pub hp_damage: i32,
    pub temp_damage: i32,
    pub total_damage: f64,
    pub half_damage: f64,
    pub double_damage: f64,
    pub applied_damage: f64,
    pub abs_damage: f64,
    /// "+" for healing, "-" for damage
    pub dmg_sign: String,
    #[serde(rename = "newHP")]
    pub new_hp: i32,
    #[serde(rename = "newTempHP")]
    pub new_temp_hp: i32,
    #[serde(rename = "oldHP")]
    pub old_hp: i32,
    #[serde(rename = "oldTempHP")]
    pub old_temp_hp: i32,
    pub button_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub di: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dv: Option<String>,
}

/// Data the card template renders from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplate {
    pub damage_applied: String,
    pub damage_list: Vec<CardLine>,
    pub needs_button_all: bool,
}

/// Old/new HP pair attached to the card for the undo feature
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEntry {
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub token_uuid: Option<String>,
    pub actor_uuid: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(rename = "oldHP")]
    pub old_hp: i32,
    #[serde(rename = "oldTempHP")]
    pub old_temp_hp: i32,
    pub total_damage: f64,
    #[serde(rename = "newHP")]
    pub new_hp: i32,
    #[serde(rename = "newTempHP")]
    pub new_temp_hp: i32,
}

/// What the builder did with a batch
#[derive(Debug)]
pub struct CardOutcome {
    pub template: CardTemplate,
    pub undo: Vec<UndoEntry>,
    pub updates_applied: usize,
    pub update_failures: usize,
    pub posted: bool,
}

/// Summary string for one trait category, `None` when nothing is notable
fn trait_summary(actor: &Actor, kind: TraitKind) -> Option<String> {
    let set = actor.traits.get(kind);
    if !set.is_notable() {
        return None;
    }
    let mut labels: Vec<&str> = set.value.iter().map(|k| damage_type_label(k)).collect();
    if !set.custom.is_empty() {
        labels.push(&set.custom);
    }
    Some(format!("{}: {}", kind.label(), labels.join(", ")))
}

/// Process one batch of damage computations
pub async fn create_reverse_damage_card(
    world: &Arc<dyn HostWorld>,
    settings_store: &SettingsStore,
    modules: &ModuleRegistry,
    config: &AutomationConfig,
    data: &DamageCardData,
) -> Result<CardOutcome, HostError> {
    let evasion_active = modules.is_active(EVASION_MODULE);
    let pc_mode = settings::pc_mode(settings_store);

    let mut pending: Vec<(String, HpUpdate)> = Vec::new();
    let mut undo: Vec<UndoEntry> = Vec::new();
    let mut lines: Vec<CardLine> = Vec::new();

    for entry in &data.damage_list {
        // Resolve the owning actor from the token, falling back to a direct
        // actor reference
        let token: Option<TokenDocument> =
            entry.token_uuid.as_deref().and_then(|uuid| world.token(uuid));
        let actor = match &token {
            Some(t) => world.actor(&t.actor_uuid),
            None => entry.actor_uuid.as_deref().and_then(|uuid| world.actor(uuid)),
        };
        let Some(actor) = actor else {
            warn!(
                token_uuid = entry.token_uuid.as_deref().unwrap_or("none"),
                actor_uuid = entry.actor_uuid.as_deref().unwrap_or("none"),
                "reverse damage card could not find actor to update HP"
            );
            continue;
        };

        let hp = actor.hp;
        let restricted = actor.kind == ActorKind::Npc && pc_mode;
        let lower = if restricted { 0 } else { -hp.max };

        // Recompute the true new HP under the extended range
        let value = entry.applied_damage.floor() as i32;
        let dt = if value > 0 { entry.old_temp_hp.min(value) } else { 0 };
        let mut new_hp = clamped(entry.old_hp - (value - dt), lower, hp.ceiling());
        // Absolute value compensates for a sign inversion during healing
        let mut hp_damage = (hp.value - new_hp).abs();
        let mut new_temp_hp = entry.new_temp_hp;
        let mut temp_damage = entry.temp_damage;
        let mut applied_damage = entry.applied_damage;

        // One-shot evasion reduction
        let reduced_flag = token
            .as_ref()
            .and_then(|t| t.flag(EVASION_MODULE, REDUCED_FLAG))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if evasion_active && reduced_flag {
            let rating = actor
                .flag(EVASION_MODULE, RATING_FLAG)
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let rule = ReductionRule::parse(rating);
            let reduced = rule.reduce(applied_damage);

            let realloc =
                reduction::reallocate(reduced, entry.old_hp, entry.old_temp_hp, temp_damage, new_temp_hp);
            temp_damage = realloc.temp_damage;
            hp_damage = realloc.hp_damage;
            new_temp_hp = realloc.new_temp_hp;
            new_hp = clamped(realloc.new_hp, lower, hp.ceiling());
            applied_damage = f64::from(reduced);

            if let Some(t) = &token {
                world
                    .unset_token_flag(&t.uuid, EVASION_MODULE, REDUCED_FLAG)
                    .await?;
            }
        }

        if data.auto_apply_damage.applies()
            && (new_hp != entry.old_hp || new_temp_hp != entry.old_temp_hp)
        {
            pending.push((
                actor.uuid.clone(),
                HpUpdate {
                    temp: new_temp_hp,
                    value: new_hp,
                    damage_applied: Some(applied_damage.floor() as i32),
                },
            ));
        }

        let actor_uuid = entry
            .actor_uuid
            .clone()
            .unwrap_or_else(|| actor.uuid.clone());
        undo.push(UndoEntry {
            token_id: entry.token_id.clone(),
            token_uuid: entry.token_uuid.clone(),
            actor_uuid: actor_uuid.clone(),
            actor_id: entry.actor_id.clone(),
            old_hp: entry.old_hp,
            old_temp_hp: entry.old_temp_hp,
            total_damage: entry.total_damage.abs(),
            new_hp,
            new_temp_hp,
        });

        // Portrait: token art, actor portrait for characters when preferred,
        // thumbnailed when the asset is a video
        let mut img = token
            .as_ref()
            .and_then(|t| t.img.clone())
            .unwrap_or_else(|| actor.img.clone());
        if config.use_player_portrait && actor.kind == ActorKind::Character && !actor.img.is_empty()
        {
            img = actor.img.clone();
        }
        if has_video_extension(&img) {
            img = world.create_thumbnail(&img, 100, 100).await?;
        }

        let token_name = match (&token, config.use_token_names) {
            (Some(t), true) if !t.name.is_empty() => t.name.clone(),
            _ => actor.name.clone(),
        };

        lines.push(CardLine {
            display_uuid: actor_uuid.replace('.', ""),
            actor_uuid,
            token_id: entry.token_id.clone().unwrap_or_else(|| "none".to_string()),
            token_uuid: entry.token_uuid.clone(),
            token_img: img,
            token_name,
            hp_damage,
            temp_damage: new_temp_hp - entry.old_temp_hp,
            total_damage: entry.total_damage.abs(),
            half_damage: (entry.total_damage / 2.0).floor().abs(),
            double_damage: (entry.total_damage * 2.0).abs(),
            applied_damage,
            abs_damage: applied_damage.abs(),
            dmg_sign: if applied_damage < 0.0 { "+" } else { "-" }.to_string(),
            new_hp,
            new_temp_hp,
            old_hp: entry.old_hp,
            old_temp_hp: entry.old_temp_hp,
            button_id: entry.token_uuid.clone(),
            di: trait_summary(&actor, TraitKind::Immunity),
            dr: trait_summary(&actor, TraitKind::Resistance),
            dv: trait_summary(&actor, TraitKind::Vulnerability),
        });
    }

    let template = CardTemplate {
        damage_applied: if data.auto_apply_damage.applies() {
            "HP Updated"
        } else {
            "HP Not Updated"
        }
        .to_string(),
        damage_list: lines,
        needs_button_all: data.damage_list.len() > 1,
    };

    // Persist concurrently; individual failures are recorded, never fatal
    let mut handles = Vec::with_capacity(pending.len());
    for (uuid, update) in pending {
        let world = Arc::clone(world);
        handles.push(tokio::spawn(async move {
            world.update_actor(&uuid, &update).await
        }));
    }
    let mut updates_applied = 0;
    let mut update_failures = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(updated)) => {
                updates_applied += 1;
                debug!(actor = %updated.uuid, hp = updated.hp.value, "damage applied");
            }
            Ok(Err(error)) => {
                update_failures += 1;
                warn!(%error, "damage update failed");
            }
            Err(error) => {
                update_failures += 1;
                warn!(%error, "damage update task aborted");
            }
        }
    }

    let mut posted = false;
    if data.auto_apply_damage.wants_card() {
        let content = render_card(&template);
        let current = world.current_user();
        let mut message = ChatMessage {
            user: current.as_ref().map(|u| u.id.clone()),
            speaker: Speaker {
                scene: None,
                alias: current.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
                user: current.as_ref().map(|u| u.id.clone()),
            },
            content,
            whisper: gamemaster_recipients(&world.users()),
            flags: Default::default(),
        };
        message.flags.insert(
            AUTOMATION_MODULE.to_string(),
            serde_json::json!({ "undoDamage": &undo }),
        );
        world.post_chat(message).await?;
        posted = true;
    }

    Ok(CardOutcome {
        template,
        undo,
        updates_applied,
        update_failures,
        posted,
    })
}

/// Render the card template as chat text
pub fn render_card(template: &CardTemplate) -> String {
    let mut out = vec![template.damage_applied.clone()];
    for line in &template.damage_list {
        let mut row = format!(
            "{} {}{}  HP {} -> {}",
            line.token_name, line.dmg_sign, line.abs_damage, line.old_hp, line.new_hp
        );
        if line.temp_damage != 0 {
            row.push_str(&format!(" (temp {})", line.temp_damage));
        }
        row.push_str(&format!(
            " [total {}, half {}, double {}]",
            line.total_damage, line.half_damage, line.double_damage
        ));
        for traits in [&line.di, &line.dr, &line.dv].into_iter().flatten() {
            row.push_str(&format!("; {}", traits));
        }
        out.push(row);
    }
    if template.needs_button_all {
        out.push("Apply to all targets".to_string());
    }
    out.join("\n")
}

/// Handler registered into the automation add-on's function registry
pub struct ReverseDamageBridge {
    pub world: Arc<dyn HostWorld>,
    pub settings: Arc<SettingsStore>,
    pub modules: Arc<ModuleRegistry>,
    pub config: AutomationConfig,
}

#[async_trait]
impl BridgeHandler for ReverseDamageBridge {
    async fn call(&self, payload: serde_json::Value) {
        let data: DamageCardData = match serde_json::from_value(payload) {
            Ok(data) => data,
            Err(error) => {
                warn!(target: MODULE_ID, %error, "malformed damage list payload");
                return;
            }
        };
        if let Err(error) =
            create_reverse_damage_card(&self.world, &self.settings, &self.modules, &self.config, &data)
                .await
        {
            warn!(target: MODULE_ID, %error, "reverse damage card failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_core::{HpAttributes, MemoryWorld, User, UserRole};

    fn world_with(entries: &[(&str, ActorKind, HpAttributes)]) -> Arc<MemoryWorld> {
        let world = Arc::new(MemoryWorld::new());
        for (name, kind, hp) in entries {
            let mut actor = Actor::new(format!("Actor.{}", name), *name, *kind);
            actor.hp = *hp;
            actor.img = format!("portraits/{}.webp", name);
            world.insert_actor(actor);
            world.insert_token(TokenDocument {
                id: format!("tok-{}", name),
                uuid: format!("Scene.s1.Token.{}", name),
                name: format!("{} token", name),
                img: None,
                actor_uuid: format!("Actor.{}", name),
                scene_id: Some("s1".to_string()),
                flags: Default::default(),
            });
        }
        world.insert_user(User {
            id: "gm1".to_string(),
            name: "GM".to_string(),
            role: UserRole::Gamemaster,
            active: true,
        });
        world.insert_user(User {
            id: "p1".to_string(),
            name: "Player".to_string(),
            role: UserRole::Player,
            active: true,
        });
        world
    }

    fn dyn_world(world: &Arc<MemoryWorld>) -> Arc<dyn HostWorld> {
        world.clone()
    }

    fn settings(pc_mode: bool) -> SettingsStore {
        let store = SettingsStore::new();
        crate::settings::register_settings(&store);
        store.set_bool(MODULE_ID, crate::settings::PC_MODE, pc_mode);
        store
    }

    fn entry(name: &str, old_hp: i32, old_temp: i32, applied: f64) -> DamageListEntry {
        DamageListEntry {
            token_id: Some(format!("tok-{}", name)),
            token_uuid: Some(format!("Scene.s1.Token.{}", name)),
            actor_id: None,
            actor_uuid: Some(format!("Actor.{}", name)),
            old_hp,
            old_temp_hp: old_temp,
            new_temp_hp: 0,
            temp_damage: 0,
            hp_damage: 0,
            total_damage: applied,
            applied_damage: applied,
            scene_id: Some("s1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_temp_pool_scenario() {
        // oldHP=10, temp=5, applied 8: dt=5, newHP = 10-3 = 7
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        let mut e = entry("mara", 10, 5, 8.0);
        e.new_temp_hp = 0;
        e.temp_damage = 5;
        let data = DamageCardData {
            damage_list: vec![e],
            auto_apply_damage: AutoApply::Yes,
        };

        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();

        assert_eq!(outcome.template.damage_list[0].new_hp, 7);
        assert_eq!(outcome.updates_applied, 1);
        assert_eq!(world.actor("Actor.mara").unwrap().hp.value, 7);
        // Mode "yes": no card
        assert!(!outcome.posted);
        assert!(world.messages().is_empty());
    }

    #[tokio::test]
    async fn test_damage_goes_negative_and_clamps() {
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(4, 20))]);
        let data = DamageCardData {
            damage_list: vec![entry("mara", 4, 0, 100.0)],
            auto_apply_damage: AutoApply::Yes,
        };

        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();
        assert_eq!(outcome.template.damage_list[0].new_hp, -20);
    }

    #[tokio::test]
    async fn test_restricted_npc_keeps_zero_floor() {
        let world = world_with(&[("ogre", ActorKind::Npc, HpAttributes::new(4, 20))]);
        let data = DamageCardData {
            damage_list: vec![entry("ogre", 4, 0, 100.0)],
            auto_apply_damage: AutoApply::Yes,
        };

        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(true),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();
        assert_eq!(outcome.template.damage_list[0].new_hp, 0);
    }

    #[tokio::test]
    async fn test_evasion_reduction_without_temp() {
        // AR "50%", applied 10, no temp: case 1, newHP = oldHP - 5
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        {
            let mut actor = world.actor("Actor.mara").unwrap();
            actor.set_flag(EVASION_MODULE, RATING_FLAG, serde_json::json!("50%"));
            world.insert_actor(actor);
            let mut token = world.token("Scene.s1.Token.mara").unwrap();
            token.set_flag(EVASION_MODULE, REDUCED_FLAG, serde_json::json!(true));
            world.insert_token(token);
        }
        let modules = ModuleRegistry::new();
        modules.register_module(EVASION_MODULE, true);

        let data = DamageCardData {
            damage_list: vec![entry("mara", 10, 0, 10.0)],
            auto_apply_damage: AutoApply::Yes,
        };
        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &modules,
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();

        let line = &outcome.template.damage_list[0];
        assert_eq!(line.hp_damage, 5);
        assert_eq!(line.new_hp, 5);
        assert_eq!(line.applied_damage, 5.0);
        // One-shot flag cleared
        let token = world.token("Scene.s1.Token.mara").unwrap();
        assert!(token.flag(EVASION_MODULE, REDUCED_FLAG).is_none());
    }

    #[tokio::test]
    async fn test_evasion_inactive_ignores_flag() {
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        {
            let mut token = world.token("Scene.s1.Token.mara").unwrap();
            token.set_flag(EVASION_MODULE, REDUCED_FLAG, serde_json::json!(true));
            world.insert_token(token);
        }

        let data = DamageCardData {
            damage_list: vec![entry("mara", 10, 0, 10.0)],
            auto_apply_damage: AutoApply::Yes,
        };
        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();
        assert_eq!(outcome.template.damage_list[0].new_hp, 0);
    }

    #[tokio::test]
    async fn test_missing_actor_skips_entry_only() {
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        let mut ghost = entry("ghost", 10, 0, 5.0);
        ghost.token_uuid = Some("Scene.s1.Token.ghost".to_string());
        ghost.actor_uuid = Some("Actor.ghost".to_string());

        let data = DamageCardData {
            damage_list: vec![ghost, entry("mara", 10, 0, 5.0)],
            auto_apply_damage: AutoApply::YesCard,
        };
        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();

        assert_eq!(outcome.template.damage_list.len(), 1);
        assert_eq!(outcome.undo.len(), 1);
        // Button-all decision counts the incoming list, skipped entries included
        assert!(outcome.template.needs_button_all);
        assert!(outcome.posted);
    }

    #[tokio::test]
    async fn test_card_whispered_to_active_gms_with_undo_flags() {
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        world.sign_in(User {
            id: "gm1".to_string(),
            name: "GM".to_string(),
            role: UserRole::Gamemaster,
            active: true,
        });
        let data = DamageCardData {
            damage_list: vec![entry("mara", 10, 0, 5.0)],
            auto_apply_damage: AutoApply::NoCard,
        };

        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();

        // Mode "noCard" never persists
        assert_eq!(outcome.updates_applied, 0);
        assert_eq!(world.actor("Actor.mara").unwrap().hp.value, 10);
        assert_eq!(outcome.template.damage_applied, "HP Not Updated");

        let messages = world.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].whisper, vec!["gm1".to_string()]);
        assert_eq!(messages[0].speaker.alias, "GM");
        let undo = &messages[0].flags[AUTOMATION_MODULE]["undoDamage"];
        assert_eq!(undo.as_array().unwrap().len(), 1);
        assert_eq!(undo[0]["oldHP"], serde_json::json!(10));
    }

    #[tokio::test]
    async fn test_persist_failures_do_not_block_batch_or_card() {
        let world = world_with(&[
            ("mara", ActorKind::Character, HpAttributes::new(10, 20)),
            ("finn", ActorKind::Character, HpAttributes::new(12, 20)),
        ]);
        world.fail_updates_for("Actor.mara");

        let data = DamageCardData {
            damage_list: vec![entry("mara", 10, 0, 5.0), entry("finn", 12, 0, 5.0)],
            auto_apply_damage: AutoApply::YesCard,
        };
        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();

        assert_eq!(outcome.updates_applied, 1);
        assert_eq!(outcome.update_failures, 1);
        assert!(outcome.posted);
        assert_eq!(world.actor("Actor.finn").unwrap().hp.value, 7);
    }

    #[tokio::test]
    async fn test_healing_shows_plus_sign_and_abs_damage() {
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        let data = DamageCardData {
            damage_list: vec![entry("mara", 10, 0, -6.0)],
            auto_apply_damage: AutoApply::Yes,
        };

        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();
        let line = &outcome.template.damage_list[0];
        assert_eq!(line.dmg_sign, "+");
        assert_eq!(line.abs_damage, 6.0);
        assert_eq!(line.new_hp, 16);
        assert_eq!(line.hp_damage, 6);
    }

    #[tokio::test]
    async fn test_video_portrait_is_thumbnailed() {
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        {
            let mut token = world.token("Scene.s1.Token.mara").unwrap();
            token.img = Some("tokens/mara.webm".to_string());
            world.insert_token(token);
        }
        let data = DamageCardData {
            damage_list: vec![entry("mara", 10, 0, 5.0)],
            auto_apply_damage: AutoApply::Yes,
        };

        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();
        assert_eq!(
            outcome.template.damage_list[0].token_img,
            "tokens/mara.webm#thumb-100x100"
        );
    }

    #[tokio::test]
    async fn test_trait_summaries_render() {
        let world = world_with(&[("mara", ActorKind::Character, HpAttributes::new(10, 20))]);
        {
            let mut actor = world.actor("Actor.mara").unwrap();
            actor.traits.dr.value = vec!["fire".to_string(), "cold".to_string()];
            actor.traits.dv.custom = "silvered weapons".to_string();
            world.insert_actor(actor);
        }
        let data = DamageCardData {
            damage_list: vec![entry("mara", 10, 0, 5.0)],
            auto_apply_damage: AutoApply::Yes,
        };

        let outcome = create_reverse_damage_card(
            &dyn_world(&world),
            &settings(false),
            &ModuleRegistry::new(),
            &AutomationConfig::default(),
            &data,
        )
        .await
        .unwrap();
        let line = &outcome.template.damage_list[0];
        assert_eq!(line.dr.as_deref(), Some("Resistances: Fire, Cold"));
        assert_eq!(line.dv.as_deref(), Some("Vulnerabilities: silvered weapons"));
        assert!(line.di.is_none());

        let rendered = render_card(&outcome.template);
        assert!(rendered.contains("Resistances: Fire, Cold"));
    }

    #[test]
    fn test_auto_apply_parsing() {
        let data: DamageCardData = serde_json::from_value(serde_json::json!({
            "damageList": [],
            "autoApplyDamage": "yesCard",
        }))
        .unwrap();
        assert_eq!(data.auto_apply_damage, AutoApply::YesCard);
        assert!(data.auto_apply_damage.applies());
        assert!(data.auto_apply_damage.wants_card());
        assert!(!AutoApply::No.applies());
        assert!(!AutoApply::Yes.wants_card());
    }
}
