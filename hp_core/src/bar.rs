//! Token HP bar painting with a negative-HP visual state
//!
//! The layout is a pure function of the HP snapshot: a negative current
//! value keeps its magnitude for the proportional math but forces the color
//! ramp to the critical end, so a dying token shows a red bar instead of an
//! empty one. Temporary-maximum bonuses widen the displayed bar; penalties
//! only move the clamp ceiling and render as an overlay at the right edge.

use crate::settings;
use host_core::canvas::{HostBarPainter, LineStyle, RoundedRect, HP_COLORS};
use host_core::{clamped, BarIndex, BarPainter, Color, Graphics, HpAttributes, SettingsStore, TokenView};
use std::sync::Arc;

/// Computed bar geometry fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLayout {
    pub negative: bool,
    /// `max(0, max + tempmax)` — the clamp ceiling
    pub effective_max: i32,
    /// Bar width denominator; tempmax penalties never shrink it below `max`
    pub display_max: i32,
    pub temp_pct: f64,
    pub value_pct: f64,
    /// Same as `value_pct`, forced to 0 for negative HP
    pub color_pct: f64,
}

/// Compute the bar fractions for an HP snapshot
///
/// All three fractions land in [0,1] for any input, including a zero or
/// negative display maximum.
pub fn compute_layout(hp: &HpAttributes) -> BarLayout {
    let negative = hp.value < 0;
    let value = hp.value.abs();
    let temp = hp.temp();
    let tempmax = hp.temp_max();

    let effective_max = (hp.max + tempmax).max(0);
    let display_max = hp.max + if tempmax > 0 { tempmax } else { 0 };

    let (temp_pct, value_pct) = if display_max > 0 {
        let denom = f64::from(display_max);
        (
            f64::from(clamped(temp, 0, display_max)) / denom,
            f64::from(clamped(value, 0, effective_max)) / denom,
        )
    } else {
        (0.0, 0.0)
    };
    let color_pct = if negative { 0.0 } else { value_pct };

    BarLayout {
        negative,
        effective_max,
        display_max,
        temp_pct,
        value_pct,
        color_pct,
    }
}

/// Red→green ramp: red at 0, green at 1
pub fn ramp_color(color_pct: f64) -> Color {
    Color::from_rgb(1.0 - color_pct / 2.0, color_pct, 0.0)
}

/// Bar painter honoring the extended negative range
///
/// Delegates wholly to the wrapped host painter for NPCs when PC-only mode
/// is enabled.
pub struct NegativeHpBarPainter {
    inner: Arc<dyn BarPainter>,
    settings: Arc<SettingsStore>,
}

impl NegativeHpBarPainter {
    pub fn new(inner: Arc<dyn BarPainter>, settings: Arc<SettingsStore>) -> Self {
        NegativeHpBarPainter { inner, settings }
    }
}

impl BarPainter for NegativeHpBarPainter {
    fn draw(&self, token: &TokenView, bar: BarIndex, gfx: &mut Graphics) {
        if settings::restricted(&token.actor, &self.settings) {
            return self.inner.draw(token, bar, gfx);
        }

        let hp = token.actor.hp;
        let layout = compute_layout(&hp);
        let tempmax = hp.temp_max();

        // Container size, borrowed from the host's own sizing rule
        let w = token.width;
        let mut h = (token.grid_size / 12.0).max(8.0);
        if token.height_cells >= 2 {
            h *= 1.6;
        }
        let bs = (h / 8.0).clamp(1.0, 2.0);
        let bs1 = bs + 1.0;

        let stroke = LineStyle {
            width: bs,
            color: Color::BLACK,
            alpha: 1.0,
        };
        let thin_stroke = LineStyle {
            width: 1.0,
            color: Color::BLACK,
            alpha: 1.0,
        };

        gfx.clear();

        // Overall bar container
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

        // Temporary maximum HP
        if tempmax > 0 {
            let pct = if layout.effective_max > 0 {
                f64::from(hp.max) / f64::from(layout.effective_max)
            } else {
                0.0
            };
            gfx.rounded_rect(RoundedRect {
                x: pct * w,
                y: 0.0,
                width: (1.0 - pct) * w,
                height: h,
                radius: 2.0,
                fill: HP_COLORS.temp_max,
                fill_alpha: 1.0,
                line: Some(thin_stroke),
            });
        }
        // Maximum HP penalty
        else if tempmax < 0 {
            let pct = if hp.max > 0 {
                f64::from(hp.max + tempmax) / f64::from(hp.max)
            } else {
                0.0
            };
            gfx.rounded_rect(RoundedRect {
                x: pct * w,
                y: 0.0,
                width: (1.0 - pct) * w,
                height: h,
                radius: 2.0,
                fill: HP_COLORS.neg_max,
                fill_alpha: 1.0,
                line: Some(thin_stroke),
            });
        }

        // Health fill
        gfx.rounded_rect(RoundedRect {
            x: 0.0,
            y: 0.0,
            width: layout.value_pct * w,
            height: h,
            radius: 2.0,
            fill: ramp_color(layout.color_pct),
            fill_alpha: 1.0,
            line: Some(stroke),
        });

        // Temporary hit points, inset by the border stroke on all sides
        if hp.temp() > 0 {
            gfx.rounded_rect(RoundedRect {
                x: bs1,
                y: bs1,
                width: (layout.temp_pct * w - 2.0 * bs1).max(0.0),
                height: h - 2.0 * bs1,
                radius: 1.0,
                fill: HP_COLORS.temp,
                fill_alpha: 1.0,
                line: None,
            });
        }

        let y = match bar {
            BarIndex::Primary => token.height - h,
            BarIndex::Secondary => 0.0,
        };
        gfx.set_position(0.0, y);
    }
}
