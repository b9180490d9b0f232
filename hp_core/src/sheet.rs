//! Death-save patch for the alternate character-sheet add-on
//!
//! That sheet keys its death-save tracker off the profile header's HP class
//! and only recognizes "hp-0-0" as at death's door. With HP allowed below
//! zero an actor can be dying at -7, so for actors at or below -1 the patch
//! rewrites the class back to the marker the sheet understands.

use host_core::{Actor, SheetView};

/// Class the sheet reads as "at death's door"
const DYING_CLASS: &str = "hp-0-0";

/// Rewrite the profile HP class when the actor has crossed below zero
pub fn display_death_save(actor: &Actor, view: &mut SheetView) {
    if actor.hp.value > -1 {
        return;
    }
    if let Some(index) = view
        .profile_classes
        .iter()
        .position(|class| class.contains("hp"))
    {
        view.profile_classes.remove(index);
    }
    view.profile_classes.push(DYING_CLASS.to_string());
}
