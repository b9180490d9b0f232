//! Module settings

use crate::MODULE_ID;
use host_core::{Actor, ActorKind, SettingChange, SettingDefinition, SettingsStore};

/// Key of the PC-only mode flag
pub const PC_MODE: &str = "pc_mode";

/// Register this module's settings with the host store
///
/// PC mode changes take effect through a full reload.
pub fn register_settings(settings: &SettingsStore) {
    settings.register(
        MODULE_ID,
        PC_MODE,
        SettingDefinition {
            name: "PC Mode".to_string(),
            hint: "Negative HP tracking will only be enabled for Player Characters.".to_string(),
            config: true,
            default: false,
            on_change: SettingChange::RequireReload,
        },
    );
}

pub fn pc_mode(settings: &SettingsStore) -> bool {
    settings.get_bool(MODULE_ID, PC_MODE)
}

/// Whether this actor keeps the host's stock zero-floor behavior
pub fn restricted(actor: &Actor, settings: &SettingsStore) -> bool {
    actor.kind == ActorKind::Npc && pc_mode(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_defaults_off() {
        let settings = SettingsStore::new();
        register_settings(&settings);
        assert!(settings.is_registered(MODULE_ID, PC_MODE));
        assert!(!pc_mode(&settings));
    }

    #[test]
    fn test_change_requests_reload() {
        let settings = SettingsStore::new();
        register_settings(&settings);
        settings.set_bool(MODULE_ID, PC_MODE, true);
        assert!(settings.take_reload_request());
    }

    #[test]
    fn test_restriction_applies_to_npcs_only() {
        let settings = SettingsStore::new();
        register_settings(&settings);
        settings.set_bool(MODULE_ID, PC_MODE, true);

        let pc = Actor::new("Actor.pc", "Mara", ActorKind::Character);
        let npc = Actor::new("Actor.npc", "Ogre", ActorKind::Npc);
        assert!(!restricted(&pc, &settings));
        assert!(restricted(&npc, &settings));

        settings.set_bool(MODULE_ID, PC_MODE, false);
        assert!(!restricted(&npc, &settings));
    }
}
