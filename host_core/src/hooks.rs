//! Pre-update hook bus
//!
//! Third parties can observe or veto a proposed HP mutation before it
//! commits. Observers run synchronously in registration order; the first one
//! returning `false` short-circuits the commit. There is no second phase: the
//! veto is checked once, immediately before the single-entity update.

use crate::actor::HpUpdate;
use serde::{Deserialize, Serialize};

/// Description of the attribute mutation being proposed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRequest {
    /// Dotted attribute path, e.g. `attributes.hp`
    pub attribute: String,
    /// The raw amount being applied
    pub value: i32,
    /// Whether `value` is a delta or an absolute target
    pub is_delta: bool,
    /// Whether the attribute backs a token bar
    pub is_bar: bool,
}

impl AttributeRequest {
    /// The request shape used for bar-backed HP damage
    pub fn hp_damage(amount: i32) -> Self {
        AttributeRequest {
            attribute: "attributes.hp".to_string(),
            value: amount,
            is_delta: false,
            is_bar: true,
        }
    }
}

type Observer = Box<dyn Fn(&AttributeRequest, &HpUpdate) -> bool + Send + Sync>;

/// Ordered observer list with veto semantics
#[derive(Default)]
pub struct PreUpdateHooks {
    observers: Vec<Observer>,
}

impl PreUpdateHooks {
    pub fn new() -> Self {
        PreUpdateHooks::default()
    }

    /// Register an observer. Returning `false` from the callback rejects the
    /// pending update.
    pub fn register<F>(&mut self, observer: F)
    where
        F: Fn(&AttributeRequest, &HpUpdate) -> bool + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Dispatch to all observers; `false` means the update was vetoed.
    pub fn call(&self, request: &AttributeRequest, update: &HpUpdate) -> bool {
        for observer in &self.observers {
            if !observer(request, update) {
                return false;
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
