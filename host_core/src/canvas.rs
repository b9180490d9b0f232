//! Canvas seam: the graphics recorder bars are drawn into
//!
//! The host hands bar painters a [`Graphics`] target each frame. The target
//! records rounded-rectangle commands instead of rasterising, so a painter is
//! a pure function from an HP snapshot to a command list and layouts can be
//! compared in tests.

use crate::actor::Actor;
use serde::{Deserialize, Serialize};

/// 24-bit packed color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);

    /// Pack floating point rgb channels (each clamped to [0,1])
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Color {
        let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        Color((to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b))
    }
}

/// Token HP overlay palette
pub struct HpPalette {
    /// Temporary hit point overlay
    pub temp: Color,
    /// Raised-maximum overlay
    pub temp_max: Color,
    /// Lowered-maximum overlay
    pub neg_max: Color,
}

/// Stock host palette for the three HP overlays
pub const HP_COLORS: HpPalette = HpPalette {
    temp: Color(0x66CCFF),
    temp_max: Color(0x440066),
    neg_max: Color(0x550000),
};

/// Stroke style for a recorded shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: Color,
    pub alpha: f64,
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub fill: Color,
    pub fill_alpha: f64,
    /// `None` disables the stroke
    pub line: Option<LineStyle>,
}

/// Recording graphics target for one bar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graphics {
    commands: Vec<RoundedRect>,
    position: (f64, f64),
}

impl Graphics {
    pub fn new() -> Self {
        Graphics::default()
    }

    /// Drop all recorded commands; position is left untouched until the next
    /// `set_position`, matching the host's clear-then-redraw cycle.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn rounded_rect(&mut self, rect: RoundedRect) {
        self.commands.push(rect);
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = (x, y);
    }

    pub fn commands(&self) -> &[RoundedRect] {
        &self.commands
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }
}

/// Which of the token's two resource bars is being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarIndex {
    /// Bottom bar
    Primary,
    /// Top bar
    Secondary,
}

/// Per-frame view of a token the painter receives
#[derive(Debug, Clone)]
pub struct TokenView {
    pub actor: Actor,
    /// Pixel width of the token
    pub width: f64,
    /// Pixel height of the token
    pub height: f64,
    /// Grid cells the token occupies vertically
    pub height_cells: u32,
    /// Pixel size of one canvas grid cell
    pub grid_size: f64,
}

/// Token bar drawing strategy
///
/// The host owns one installed painter; a module replaces it with a decorator
/// that keeps the previous painter as its fallback.
pub trait BarPainter: Send + Sync {
    fn draw(&self, token: &TokenView, bar: BarIndex, gfx: &mut Graphics);
}

/// The host's stock painter: a single fill clamped at the zero floor
///
/// Kept minimal on purpose; decorators delegate here when they decline to
/// override (e.g. NPCs under PC-only mode).
pub struct HostBarPainter;

impl BarPainter for HostBarPainter {
    fn draw(&self, token: &TokenView, bar: BarIndex, gfx: &mut Graphics) {
        let hp = token.actor.hp;
        let max = hp.max.max(0);
        let pct = if max > 0 {
            f64::from(hp.value.clamp(0, max)) / f64::from(max)
        } else {
            0.0
        };

        let w = token.width;
        let mut h = (token.grid_size / 12.0).max(8.0);
        if token.height_cells >= 2 {
            h *= 1.6;
        }
        let bs = (h / 8.0).clamp(1.0, 2.0);
        let stroke = LineStyle {
            width: bs,
            color: Color::BLACK,
            alpha: 1.0,
        };

        gfx.clear();
        gfx.rounded_rect(RoundedRect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
            radius: 3.0,
            fill: Color::BLACK,
            fill_alpha: 0.5,
            line: Some(stroke),
        });
        gfx.rounded_rect(RoundedRect {
            x: 0.0,
            y: 0.0,
            width: pct * w,
            height: h,
            radius: 2.0,
            fill: Color::from_rgb(1.0 - pct / 2.0, pct, 0.0),
            fill_alpha: 1.0,
            line: Some(stroke),
        });

        let y = match bar {
            BarIndex::Primary => token.height - h,
            BarIndex::Secondary => 0.0,
        };
        gfx.set_position(0.0, y);
    }
}
