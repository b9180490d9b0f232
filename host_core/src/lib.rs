//! host_core - Host extension seams for the negative-hp module
//!
//! This crate models the slice of the virtual-tabletop host that the
//! negative-hp module touches, as injectable seams instead of shared
//! prototypes:
//! - Actor/token records and HP attributes ([`actor`])
//! - The token bar painter slot and its graphics recorder ([`canvas`])
//! - The damage application strategy slot ([`damage`])
//! - The pre-update veto hook bus ([`hooks`])
//! - The module registry / service locator ([`registry`])
//! - The settings registration facility ([`settings`])
//! - Chat payloads and whisper routing ([`chat`])
//! - The async persistence boundary with an in-memory test world ([`world`])
//!
//! [`Host`] ties the seams together and exposes the entry points the host
//! event loop drives.

pub mod actor;
pub mod canvas;
pub mod chat;
pub mod damage;
pub mod hooks;
pub mod host;
pub mod registry;
pub mod settings;
pub mod sheet;
pub mod world;

pub use actor::{clamped, Actor, ActorKind, HpAttributes, HpUpdate, TokenDocument, TraitKind};
pub use canvas::{BarIndex, BarPainter, Color, Graphics, HostBarPainter, TokenView};
pub use chat::{gamemaster_recipients, ChatMessage, Speaker, User, UserRole};
pub use damage::{DamageStrategy, HostDamage};
pub use hooks::{AttributeRequest, PreUpdateHooks};
pub use host::Host;
pub use registry::{BridgeHandler, ModuleRegistry};
pub use settings::{ConfigError, SettingChange, SettingDefinition, SettingsStore};
pub use sheet::SheetView;
pub use world::{has_video_extension, HostWorld, MemoryWorld};

use thiserror::Error;

/// Error crossing the host boundary
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no actor for uuid '{0}'")]
    MissingActor(String),
    #[error("no token for uuid '{0}'")]
    MissingToken(String),
    #[error("unknown module '{0}'")]
    UnknownModule(String),
    #[error("unknown function '{module}.{name}'")]
    UnknownFunction { module: String, name: String },
    #[error("update failed for '{uuid}': {message}")]
    UpdateFailed { uuid: String, message: String },
    #[error("chat creation failed: {0}")]
    Chat(String),
}
