//! Damage application seam
//!
//! The host owns one installed [`DamageStrategy`]; modules replace it with a
//! decorator keeping the previous strategy as fallback. Every strategy runs
//! the pre-update hook veto before persisting and returns the actor
//! unchanged when vetoed.

use crate::actor::{clamped, Actor, HpUpdate};
use crate::hooks::{AttributeRequest, PreUpdateHooks};
use crate::world::HostWorld;
use crate::HostError;
use async_trait::async_trait;

/// Actor damage application strategy
#[async_trait]
pub trait DamageStrategy: Send + Sync {
    /// Apply `floor(amount * multiplier)` damage (negative amounts heal) and
    /// persist the result.
    async fn apply(
        &self,
        actor: &Actor,
        amount: f64,
        multiplier: f64,
        world: &dyn HostWorld,
        hooks: &PreUpdateHooks,
    ) -> Result<Actor, HostError>;
}

/// The host's stock strategy: temp pool first, current HP floored at zero
pub struct HostDamage;

#[async_trait]
impl DamageStrategy for HostDamage {
    async fn apply(
        &self,
        actor: &Actor,
        amount: f64,
        multiplier: f64,
        world: &dyn HostWorld,
        hooks: &PreUpdateHooks,
    ) -> Result<Actor, HostError> {
        let amount = (amount * multiplier).floor() as i32;
        let hp = actor.hp;

        // Deduct damage from temp HP first; healing never consumes temp
        let tmp = hp.temp();
        let dt = if amount > 0 { tmp.min(amount) } else { 0 };
        let dh = clamped(hp.value - (amount - dt), 0, hp.ceiling());

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
