//! Rendered character-sheet view
//!
//! Minimal stand-in for the DOM fragment a sheet add-on hands to render
//! observers: the CSS class list of the profile header element they patch.

use serde::{Deserialize, Serialize};

/// A rendered sheet's profile header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetView {
    pub profile_classes: Vec<String>,
}

impl SheetView {
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SheetView {
            profile_classes: classes.into_iter().map(Into::into).collect(),
        }
    }
}
