//! Host façade
//!
//! Owns the extension seams and drives them the way the host event loop
//! would: bar redraws, damage application, sheet render observers. Modules
//! install themselves by swapping decorators into the painter and damage
//! slots and registering observers; the host decides when each entry point
//! runs.

use crate::actor::Actor;
use crate::canvas::{BarIndex, BarPainter, Graphics, HostBarPainter, TokenView};
use crate::damage::{DamageStrategy, HostDamage};
use crate::hooks::PreUpdateHooks;
use crate::registry::ModuleRegistry;
use crate::settings::SettingsStore;
use crate::sheet::SheetView;
use crate::world::HostWorld;
use crate::HostError;
use std::sync::Arc;

type SheetObserver = Box<dyn Fn(&Actor, &mut SheetView) + Send + Sync>;

pub struct Host {
    pub settings: Arc<SettingsStore>,
    pub modules: Arc<ModuleRegistry>,
    pub hooks: PreUpdateHooks,
    world: Arc<dyn HostWorld>,
    bar_painter: Arc<dyn BarPainter>,
    damage: Arc<dyn DamageStrategy>,
    sheet_observers: Vec<SheetObserver>,
}

impl Host {
    /// A host with the stock painter and damage strategy installed
    pub fn new(world: Arc<dyn HostWorld>) -> Self {
        Host {
            settings: Arc::new(SettingsStore::new()),
            modules: Arc::new(ModuleRegistry::new()),
            hooks: PreUpdateHooks::new(),
            world,
            bar_painter: Arc::new(HostBarPainter),
            damage: Arc::new(HostDamage),
            sheet_observers: Vec::new(),
        }
    }

    pub fn world(&self) -> Arc<dyn HostWorld> {
        Arc::clone(&self.world)
    }

    /// The currently installed painter, for decorators to wrap
    pub fn bar_painter(&self) -> Arc<dyn BarPainter> {
        Arc::clone(&self.bar_painter)
    }

    pub fn set_bar_painter(&mut self, painter: Arc<dyn BarPainter>) {
        self.bar_painter = painter;
    }

    /// The currently installed damage strategy, for decorators to wrap
    pub fn damage_strategy(&self) -> Arc<dyn DamageStrategy> {
        Arc::clone(&self.damage)
    }

    pub fn set_damage_strategy(&mut self, strategy: Arc<dyn DamageStrategy>) {
        self.damage = strategy;
    }

    /// Redraw one token bar into the given graphics target
    pub fn draw_bar(&self, token: &TokenView, bar: BarIndex, gfx: &mut Graphics) {
        self.bar_painter.draw(token, bar, gfx);
    }

    /// Apply damage to an actor through the installed strategy
    pub async fn apply_damage(
        &self,
        actor_uuid: &str,
        amount: f64,
        multiplier: f64,
    ) -> Result<Actor, HostError> {
        let actor = self
            .world
            .actor(actor_uuid)
            .ok_or_else(|| HostError::MissingActor(actor_uuid.to_string()))?;
        self.damage
            .apply(&actor, amount, multiplier, self.world.as_ref(), &self.hooks)
            .await
    }

    /// Register an observer invoked after a sheet render
    pub fn on_sheet_render<F>(&mut self, observer: F)
    where
        F: Fn(&Actor, &mut SheetView) + Send + Sync + 'static,
    {
        self.sheet_observers.push(Box::new(observer));
    }

    /// Run all sheet render observers against a freshly rendered view
    pub fn render_sheet(&self, actor: &Actor, view: &mut SheetView) {
        for observer in &self.sheet_observers {
            observer(actor, view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorKind, HpAttributes};
    use crate::world::MemoryWorld;

    #[tokio::test]
    async fn test_apply_damage_unknown_actor() {
        let host = Host::new(Arc::new(MemoryWorld::new()));
        let result = host.apply_damage("Actor.missing", 5.0, 1.0).await;
        assert!(matches!(result, Err(HostError::MissingActor(_))));
    }

    #[tokio::test]
    async fn test_apply_damage_uses_installed_strategy() {
        let world = Arc::new(MemoryWorld::new());
        let mut actor = Actor::new("Actor.a1", "Mara", ActorKind::Character);
        actor.hp = HpAttributes::new(10, 20);
        world.insert_actor(actor);

        let host = Host::new(world);
        let updated = host.apply_damage("Actor.a1", 4.0, 1.0).await.unwrap();
        assert_eq!(updated.hp.value, 6);
    }

    #[test]
    fn test_sheet_observers_run_in_order() {
        let world = Arc::new(MemoryWorld::new());
        let mut host = Host::new(world);
        host.on_sheet_render(|_, view| view.profile_classes.push("first".to_string()));
        host.on_sheet_render(|_, view| view.profile_classes.push("second".to_string()));

        let actor = Actor::new("Actor.a1", "Mara", ActorKind::Character);
        let mut view = SheetView::default();
        host.render_sheet(&actor, &mut view);
        assert_eq!(view.profile_classes, vec!["first", "second"]);
    }
}
