//! Module registry / service locator
//!
//! Process-wide registry keyed by module id. Optional add-ons are discovered
//! by capability probing (`is_active`); absence is a normal state, not an
//! error. Each module carries a named-function table other modules can
//! register handlers into, with payloads crossing as JSON the way the host's
//! socket layer ships them.

use crate::HostError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Handler registered into a module's function table
#[async_trait]
pub trait BridgeHandler: Send + Sync {
    async fn call(&self, payload: serde_json::Value);
}

#[derive(Default)]
struct ModuleEntry {
    active: bool,
    functions: HashMap<String, Arc<dyn BridgeHandler>>,
}

/// Registry of known modules, populated at host startup and never torn down
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, ModuleEntry>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry::default()
    }

    /// Record a module and whether the user has it enabled
    pub fn register_module(&self, id: impl Into<String>, active: bool) {
        let mut modules = self.modules.write().unwrap_or_else(|e| e.into_inner());
        modules.insert(
            id.into(),
            ModuleEntry {
                active,
                functions: HashMap::new(),
            },
        );
    }

    /// Capability probe: is the module present and enabled?
    pub fn is_active(&self, id: &str) -> bool {
        let modules = self.modules.read().unwrap_or_else(|e| e.into_inner());
        modules.get(id).is_some_and(|m| m.active)
    }

    /// Register a named function on a module's table
    pub fn set_function(
        &self,
        module: &str,
        name: impl Into<String>,
        handler: Arc<dyn BridgeHandler>,
    ) -> Result<(), HostError> {
        let mut modules = self.modules.write().unwrap_or_else(|e| e.into_inner());
        let entry = modules
            .get_mut(module)
            .ok_or_else(|| HostError::UnknownModule(module.to_string()))?;
        let name = name.into();
        debug!(module, function = %name, "bridge function registered");
        entry.functions.insert(name, handler);
        Ok(())
    }

    /// Whether a named function has been registered
    pub fn has_function(&self, module: &str, name: &str) -> bool {
        let modules = self.modules.read().unwrap_or_else(|e| e.into_inner());
        modules
            .get(module)
            .is_some_and(|m| m.functions.contains_key(name))
    }

    /// Invoke a registered function with a JSON payload
    pub async fn invoke(
        &self,
        module: &str,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<(), HostError> {
        let handler = {
            let modules = self.modules.read().unwrap_or_else(|e| e.into_inner());
            modules
                .get(module)
                .and_then(|m| m.functions.get(name))
                .cloned()
                .ok_or_else(|| HostError::UnknownFunction {
                    module: module.to_string(),
                    name: name.to_string(),
                })?
        };
        handler.call(payload).await;
        Ok(())
    }
}
