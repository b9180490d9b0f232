//! Evasion damage reduction
//!
//! An optional add-on marks a token with a one-shot `reduced` flag after an
//! evasion effect. Its reduction rating is a string: a percentage ("50%"),
//! a decimal fraction ("0.5"), or a flat integer, defaulting to 10 when
//! unparsable. Reduced damage is then reallocated across temp and current
//! HP in exactly one of three mutually exclusive cases.

/// Flag scope used by the evasion add-on
pub const EVASION_MODULE: &str = "evasion-class";
/// One-shot marker set by the add-on when an evasion effect fired
pub const REDUCED_FLAG: &str = "reduced";
/// Actor flag carrying the reduction rating string
pub const RATING_FLAG: &str = "ar";

const DEFAULT_FLAT: i32 = 10;

/// Parsed reduction rating
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReductionRule {
    /// Subtract a flat amount, floored at zero
    Flat(i32),
    /// Multiply by `1 - fraction`, flooring the result
    Fraction(f64),
}

impl ReductionRule {
    pub fn parse(raw: &str) -> ReductionRule {
        let raw = raw.trim();
        if raw.contains('%') {
            raw.trim_end_matches('%')
                .trim()
                .parse::<f64>()
                .map(|v| ReductionRule::Fraction(v / 100.0))
                .unwrap_or(ReductionRule::Flat(DEFAULT_FLAT))
        } else if raw.contains('.') {
            raw.parse::<f64>()
                .map(ReductionRule::Fraction)
                .unwrap_or(ReductionRule::Flat(DEFAULT_FLAT))
        } else {
            ReductionRule::Flat(raw.parse::<i32>().unwrap_or(DEFAULT_FLAT))
        }
    }

    /// Apply the rule to a full applied-damage figure
    pub fn reduce(&self, applied: f64) -> i32 {
        match self {
            ReductionRule::Flat(ar) => (applied - f64::from(*ar)).max(0.0) as i32,
            ReductionRule::Fraction(ar) => (applied * (1.0 - ar)).floor() as i32,
        }
    }
}

/// Result of reallocating reduced damage across temp and current HP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reallocation {
    pub temp_damage: i32,
    pub hp_damage: i32,
    pub new_temp_hp: i32,
    pub new_hp: i32,
}

/// Reallocate `reduced` damage, evaluated against the pre-damage HP state
///
/// Cases, in order:
/// 1. No temp damage was recorded — everything hits current HP, temp state
///    passes through untouched.
/// 2. Temp HP absorbs the whole reduced amount — current HP unaffected.
/// 3. Temp HP breaks — temp zeroes out, the remainder hits current HP.
pub fn reallocate(
    reduced: i32,
    old_hp: i32,
    old_temp_hp: i32,
    entry_temp_damage: i32,
    entry_new_temp_hp: i32,
) -> Reallocation {
    if entry_temp_damage == 0 {
        Reallocation {
            temp_damage: entry_temp_damage,
            hp_damage: reduced,
            new_temp_hp: entry_new_temp_hp,
            new_hp: old_hp - reduced,
        }
    } else if old_temp_hp >= reduced {
        Reallocation {
            temp_damage: reduced,
            hp_damage: 0,
            new_temp_hp: old_temp_hp - reduced,
            new_hp: old_hp,
        }
    } else {
        let hp_damage = reduced - old_temp_hp;
        Reallocation {
            temp_damage: old_temp_hp,
            hp_damage,
            new_temp_hp: 0,
            new_hp: old_hp - hp_damage,
        }
    }
}
