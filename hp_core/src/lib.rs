//! Negative hit points for the tabletop host
//!
//! The host clamps current HP at zero; this module extends the range down to
//! the negated maximum so dying and bleed-out rules have a number to work
//! with. It installs in the host's three startup stages:
//!
//! - [`init`]: register the PC-only mode setting.
//! - [`setup`]: wrap the host's bar painter and damage strategy with the
//!   negative-HP decorators.
//! - [`ready`]: probe the optional combat-automation and sheet add-ons and
//!   register the integration hooks for whichever are active.
//!
//! Everything is host-driven; the module never initiates work on its own.

pub mod bar;
pub mod card;
pub mod damage;
pub mod reduction;
pub mod settings;
pub mod sheet;

pub use bar::{compute_layout, ramp_color, BarLayout, NegativeHpBarPainter};
pub use card::{
    create_reverse_damage_card, render_card, AutoApply, AutomationConfig, CardLine, CardOutcome,
    CardTemplate, DamageCardData, DamageListEntry, ReverseDamageBridge, UndoEntry,
};
pub use damage::NegativeHpDamage;
pub use reduction::{reallocate, Reallocation, ReductionRule};

use host_core::{Host, HostError};
use std::sync::Arc;
use tracing::debug;

/// Settings namespace and flag scope for this module
pub const MODULE_ID: &str = "negative-hp";

/// Id of the combat-automation add-on
pub const AUTOMATION_MODULE: &str = "midi-qol";

/// Name this module registers in the automation add-on's function table
pub const CARD_FUNCTION: &str = "createReverseDamageCard";

/// Id of the alternate character-sheet add-on
pub const SHEET_MODULE: &str = "tidy5e-sheet";

/// Init stage: settings registration only
pub fn init(host: &Host) {
    settings::register_settings(&host.settings);
}

/// Setup stage: swap the negative-HP decorators into the host seams
///
/// Both decorators keep a handle to whatever was installed before them and
/// delegate to it for actors the PC-only mode excludes.
pub fn setup(host: &mut Host) {
    let settings = Arc::clone(&host.settings);
    host.set_bar_painter(Arc::new(NegativeHpBarPainter::new(
        host.bar_painter(),
        Arc::clone(&settings),
    )));
    host.set_damage_strategy(Arc::new(NegativeHpDamage::new(
        host.damage_strategy(),
        settings,
    )));
}

/// Ready stage: hook whichever optional add-ons turned out to be active
pub fn ready(host: &mut Host, config: AutomationConfig) -> Result<(), HostError> {
    if host.modules.is_active(AUTOMATION_MODULE) {
        debug!(module = AUTOMATION_MODULE, "registering reverse damage card");
        host.modules.set_function(
            AUTOMATION_MODULE,
            CARD_FUNCTION,
            Arc::new(ReverseDamageBridge {
                world: host.world(),
                settings: Arc::clone(&host.settings),
                modules: Arc::clone(&host.modules),
                config,
            }),
        )?;
    }
    if host.modules.is_active(SHEET_MODULE) {
        debug!(module = SHEET_MODULE, "registering death save patch");
        host.on_sheet_render(sheet::display_death_save);
    }
    Ok(())
}

/// Run all three stages in order
pub fn install(host: &mut Host, config: AutomationConfig) -> Result<(), HostError> {
    init(host);
    setup(host);
    ready(host, config)
}
