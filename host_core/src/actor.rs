//! Host-owned actor and token records
//!
//! These mirror the slice of the host document model the negative-hp module
//! reads: hit point attributes, the PC/NPC discriminator, damage traits, and
//! the free-form flag store. Mutation goes through [`crate::HostWorld`], never
//! through direct field writes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Clamp in the host's order of operations: `min(upper, max(lower, value))`.
///
/// With inverted bounds this resolves to `upper`, matching the host math
/// helper, where `i32::clamp` would panic.
pub fn clamped(value: i32, lower: i32, upper: i32) -> i32 {
    value.max(lower).min(upper)
}

/// Actor type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Player character
    Character,
    /// Non-player character
    Npc,
}

/// Hit point attribute snapshot
///
/// `value` is signed and may go negative under the extended clamp. `temp` and
/// `tempmax` are optional in host data; absent values coerce to 0. A positive
/// `tempmax` raises the HP ceiling, a negative one lowers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpAttributes {
    pub value: i32,
    pub max: i32,
    #[serde(default)]
    pub temp: Option<i32>,
    #[serde(default)]
    pub tempmax: Option<i32>,
}

impl HpAttributes {
    pub fn new(value: i32, max: i32) -> Self {
        HpAttributes {
            value,
            max,
            temp: None,
            tempmax: None,
        }
    }

    /// Temporary HP, coerced to 0 when absent
    pub fn temp(&self) -> i32 {
        self.temp.unwrap_or(0)
    }

    /// Temporary maximum adjustment, coerced to 0 when absent
    pub fn temp_max(&self) -> i32 {
        self.tempmax.unwrap_or(0)
    }

    /// Upper clamp bound: `max + tempmax`
    pub fn ceiling(&self) -> i32 {
        self.max + self.temp_max()
    }
}

/// Proposed hit point update, persisted through the host update API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpUpdate {
    pub temp: i32,
    pub value: i32,
    /// Applied-damage figure recorded as undo metadata
    #[serde(default)]
    pub damage_applied: Option<i32>,
}

/// Kinds of damage trait an actor can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    Immunity,
    Resistance,
    Vulnerability,
}

impl TraitKind {
    /// Display heading for a trait summary line
    pub fn label(&self) -> &'static str {
        match self {
            TraitKind::Immunity => "Immunities",
            TraitKind::Resistance => "Resistances",
            TraitKind::Vulnerability => "Vulnerabilities",
        }
    }

    pub fn all() -> &'static [TraitKind] {
        &[
            TraitKind::Immunity,
            TraitKind::Vulnerability,
            TraitKind::Resistance,
        ]
    }
}

/// One trait category: a list of damage-type keys plus free custom text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitSet {
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(default)]
    pub custom: String,
}

impl TraitSet {
    /// Whether anything is worth displaying
    pub fn is_notable(&self) -> bool {
        !self.custom.is_empty() || !self.value.is_empty()
    }
}

/// Damage trait block: immunities, resistances, vulnerabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorTraits {
    #[serde(default)]
    pub di: TraitSet,
    #[serde(default)]
    pub dr: TraitSet,
    #[serde(default)]
    pub dv: TraitSet,
}

impl ActorTraits {
    pub fn get(&self, kind: TraitKind) -> &TraitSet {
        match kind {
            TraitKind::Immunity => &self.di,
            TraitKind::Resistance => &self.dr,
            TraitKind::Vulnerability => &self.dv,
        }
    }
}

/// Display label for a damage-type trait key
///
/// Unknown keys pass through unchanged so custom host content still renders.
pub fn damage_type_label(key: &str) -> &str {
    match key {
        "acid" => "Acid",
        "bludgeoning" => "Bludgeoning",
        "cold" => "Cold",
        "fire" => "Fire",
        "force" => "Force",
        "lightning" => "Lightning",
        "necrotic" => "Necrotic",
        "piercing" => "Piercing",
        "poison" => "Poison",
        "psychic" => "Psychic",
        "radiant" => "Radiant",
        "slashing" => "Slashing",
        "thunder" => "Thunder",
        other => other,
    }
}

/// Host-owned actor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub uuid: String,
    pub id: String,
    pub name: String,
    pub kind: ActorKind,
    /// Portrait image path
    pub img: String,
    pub hp: HpAttributes,
    #[serde(default)]
    pub traits: ActorTraits,
    /// Flag store keyed `scope.key`
    #[serde(default)]
    pub flags: HashMap<String, serde_json::Value>,
}

impl Actor {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, kind: ActorKind) -> Self {
        let uuid = uuid.into();
        Actor {
            id: uuid.clone(),
            uuid,
            name: name.into(),
            kind,
            img: String::new(),
            hp: HpAttributes::new(0, 0),
            traits: ActorTraits::default(),
            flags: HashMap::new(),
        }
    }

    pub fn flag(&self, scope: &str, key: &str) -> Option<&serde_json::Value> {
        self.flags.get(&format!("{}.{}", scope, key))
    }

    pub fn set_flag(&mut self, scope: &str, key: &str, value: serde_json::Value) {
        self.flags.insert(format!("{}.{}", scope, key), value);
    }
}

/// Host-owned token document placed on a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDocument {
    pub id: String,
    pub uuid: String,
    pub name: String,
    /// Token art; falls back to the actor portrait when absent
    #[serde(default)]
    pub img: Option<String>,
    pub actor_uuid: String,
    #[serde(default)]
    pub scene_id: Option<String>,
    #[serde(default)]
    pub flags: HashMap<String, serde_json::Value>,
}

impl TokenDocument {
    pub fn flag(&self, scope: &str, key: &str) -> Option<&serde_json::Value> {
        self.flags.get(&format!("{}.{}", scope, key))
    }

    pub fn set_flag(&mut self, scope: &str, key: &str, value: serde_json::Value) {
        self.flags.insert(format!("{}.{}", scope, key), value);
    }
}
