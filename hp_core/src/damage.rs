//! Damage application under the extended negative range
//!
//! Same shape as the host's stock strategy, with the lower clamp bound
//! opened to `-max` so death-save and bleed-out mechanics can track how far
//! below zero an actor has fallen.

use crate::settings;
use host_core::{
    clamped, Actor, AttributeRequest, DamageStrategy, HostError, HostWorld, HpUpdate,
    PreUpdateHooks, SettingsStore,
};
use async_trait::async_trait;
use std::sync::Arc;

pub struct NegativeHpDamage {
    inner: Arc<dyn DamageStrategy>,
    settings: Arc<SettingsStore>,
}

impl NegativeHpDamage {
    pub fn new(inner: Arc<dyn DamageStrategy>, settings: Arc<SettingsStore>) -> Self {
        NegativeHpDamage { inner, settings }
    }
}

#[async_trait]
impl DamageStrategy for NegativeHpDamage {
    async fn apply(
        &self,
        actor: &Actor,
        amount: f64,
        multiplier: f64,
        world: &dyn HostWorld,
        hooks: &PreUpdateHooks,
    ) -> Result<Actor, HostError> {
        if settings::restricted(actor, &self.settings) {
            return self.inner.apply(actor, amount, multiplier, world, hooks).await;
        }

        let amount = (amount * multiplier).floor() as i32;
        let hp = actor.hp;

        // Deduct damage from temp HP first; healing never consumes temp
        let tmp = hp.temp();
        let dt = if amount > 0 { tmp.min(amount) } else { 0 };

        // Remaining goes to health, clamped into [-max, max + tempmax]
        let dh = clamped(hp.value - (amount - dt), -hp.max, hp.ceiling());

        let update = HpUpdate {
            temp: tmp - dt,
            value: dh,
            damage_applied: None,
        };
        if !hooks.call(&AttributeRequest::hp_damage(amount), &update) {
            return Ok(actor.clone());
        }
        world.update_actor(&actor.uuid, &update).await
    }
}
